//! Model-backed schemas
//!
//! Bridges the marshalling core to a storage layer through the
//! [`ModelAdapter`] collaborator.

pub mod adapter;
pub mod model_serializer;
pub mod reference_field;

pub use adapter::{Column, ColumnType, ModelAdapter};
pub use model_serializer::{ModelSchemaBuilder, field_for_column};
pub use reference_field::ReferenceField;
