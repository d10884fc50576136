//! Serializer composition
//!
//! [`Schema`]s assemble field templates from bases and mixins;
//! [`SerializerField`], [`ListSerializerField`] and [`ProxyField`] turn a
//! schema into a field so it can nest, repeat or dispatch; [`Serializer`] is
//! the per-request entry point that validates, renders and saves.

pub mod list;
pub mod proxy;
pub mod schema;
pub mod serializer;
pub mod serializer_field;

pub use list::ListSerializerField;
pub use proxy::ProxyField;
pub use schema::{Base, Hooks, Mixin, MixinBuilder, Schema, SchemaBuilder, merge};
pub use serializer::Serializer;
pub use serializer_field::SerializerField;

use crate::field::Field;
use std::sync::Arc;

impl Field {
	/// A nested object of `schema`
	pub fn nested(schema: &Arc<Schema>) -> Self {
		Field::new(SerializerField::new(Arc::clone(schema)))
	}

	/// A list of `schema` objects
	pub fn many(schema: &Arc<Schema>) -> Self {
		Field::new(ListSerializerField::new(schema))
	}
}
