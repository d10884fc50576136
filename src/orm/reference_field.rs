use super::adapter::ModelAdapter;
use super::model_serializer::field_for_column;
use crate::context::Parent;
use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::serializers::Schema;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Foreign-key field resolving a primary key to the related entity
///
/// Input is the bare key or an object carrying it under the primary-key
/// column name. Output is the rendered key, or the nested object when a
/// schema is attached.
#[derive(Clone)]
pub struct ReferenceField {
	adapter: Arc<dyn ModelAdapter>,
	key_name: String,
	key_field: Box<Field>,
	nested: Option<Box<Field>>,
}

impl ReferenceField {
	pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
		let primary_key = adapter.primary_key();
		let key_field = primary_key
			.as_ref()
			.and_then(|column| field_for_column(&column.column_type))
			.unwrap_or_else(Field::integer);
		let key_name = primary_key.map_or_else(|| "id".to_string(), |column| column.name);

		Self {
			adapter,
			key_name,
			key_field: Box::new(key_field),
			nested: None,
		}
	}

	/// Render related entities through `schema` instead of as a bare key
	pub fn with_schema(mut self, schema: &Arc<Schema>) -> Self {
		self.nested = Some(Box::new(Field::nested(schema)));
		self
	}
}

impl fmt::Debug for ReferenceField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ReferenceField")
			.field("model", &self.adapter.model_name())
			.field("key_name", &self.key_name)
			.field("key_field", &self.key_field)
			.field("nested", &self.nested)
			.finish()
	}
}

impl FieldType for ReferenceField {
	fn type_name(&self) -> &'static str {
		"reference"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[
			("not_found", "Object not found."),
			("no_id", "No ID supplied."),
		]
	}

	fn bind(&mut self, parent: &Parent) {
		self.key_field.bind(parent, Some(&self.key_name));
		if let Some(nested) = &mut self.nested {
			nested.bind(parent, None);
		}
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		let key = match data {
			Value::Map(entries) => match entries.get(&self.key_name) {
				None | Some(Value::Null) => return Err(field.fail("no_id")),
				Some(key) => self.key_field.to_internal_value(key.clone())?,
			},
			Value::Entity(ref entity) => match entity.attribute(&self.key_name) {
				None | Some(Value::Null) => return Err(field.fail("no_id")),
				Some(key) => self.key_field.to_internal_value(key)?,
			},
			other => self.key_field.to_internal_value(other)?,
		};

		self.adapter.get(&key).ok_or_else(|| field.fail("not_found"))
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		if let Some(nested) = &self.nested {
			return nested.to_representation(value);
		}

		let key = match value {
			Value::Map(entries) => entries.get(&self.key_name).cloned(),
			Value::Entity(entity) => entity.attribute(&self.key_name),
			scalar => Some(scalar.clone()),
		};
		match key {
			None => Err(RepresentationError::MissingAttribute {
				attribute: self.key_name.clone(),
				type_name: self.adapter.model_name().to_string(),
			}),
			Some(Value::Null) => Ok(Value::Null),
			Some(key) => self.key_field.to_representation(&key),
		}
	}
}

impl Field {
	/// Foreign key to a model served by `adapter`
	pub fn reference(adapter: Arc<dyn ModelAdapter>) -> Self {
		Field::new(ReferenceField::new(adapter))
	}
}
