use super::schema::Schema;
use crate::context::Parent;
use crate::errors::{FieldResult, RepresentationError, SerializerError};
use crate::field::{Field, FieldType};
use crate::fields::list_field::{represent_items, validate_items};
use crate::value::Value;
use std::sync::Arc;

/// List of nested objects sharing one schema
///
/// Each item runs the child's full validation; failures are reported per
/// index. `create` persists every item through the child schema.
#[derive(Debug, Clone)]
pub struct ListSerializerField {
	child: Box<Field>,
}

impl ListSerializerField {
	pub fn new(schema: &Arc<Schema>) -> Self {
		Self::of(Field::nested(schema))
	}

	/// List over an arbitrary composite child, e.g. a proxy
	pub fn of(child: Field) -> Self {
		Self {
			child: Box::new(child),
		}
	}

	pub fn child(&self) -> &Field {
		&self.child
	}
}

impl FieldType for ListSerializerField {
	fn type_name(&self) -> &'static str {
		"list_serializer"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("not_a_list", "Expected a list.")]
	}

	fn bind(&mut self, parent: &Parent) {
		self.child.bind(parent, None);
	}

	fn default_value(&self) -> Option<Value> {
		Some(Value::List(Vec::new()))
	}

	fn initial(&self, _field: &Field) -> Option<Value> {
		Some(Value::List(Vec::new()))
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match data {
			Value::List(items) => validate_items(&self.child, items),
			_ => Err(field.fail("not_a_list")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::List(items) => represent_items(&self.child, items).map(Value::List),
			other => Err(RepresentationError::unrepresentable("a list", other)),
		}
	}

	fn fields(&self) -> Option<&indexmap::IndexMap<String, Field>> {
		self.child.fields()
	}

	fn create(&self, field: &Field, data: Value) -> Result<Value, SerializerError> {
		let Value::List(items) = data else {
			return Err(SerializerError::Save(format!(
				"{} expects a list, got {}",
				field.type_name(),
				data.kind()
			)));
		};

		let created = items
			.into_iter()
			.map(|item| self.child.create(item))
			.collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(count = created.len(), "bulk create finished");
		Ok(Value::List(created))
	}
}
