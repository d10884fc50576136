use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::Value;
use uuid::Uuid;

fn canonical(uuid: &Uuid) -> Value {
	Value::String(uuid.hyphenated().to_string())
}

/// UUID field
///
/// Accepts typed UUIDs and hyphenated or 32-hex-digit strings in any case;
/// both directions produce the lowercase hyphenated string.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidField;

impl FieldType for UuidField {
	fn type_name(&self) -> &'static str {
		"uuid"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "A valid UUID is required.")]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match &data {
			Value::Uuid(uuid) => Ok(canonical(uuid)),
			Value::String(s) => Uuid::parse_str(s.trim())
				.map(|uuid| canonical(&uuid))
				.map_err(|_| field.fail("invalid")),
			_ => Err(field.fail("invalid")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::Uuid(uuid) => Ok(canonical(uuid)),
			Value::String(s) => Uuid::parse_str(s)
				.map(|uuid| canonical(&uuid))
				.map_err(|_| RepresentationError::unrepresentable("a UUID", value)),
			other => Err(RepresentationError::unrepresentable("a UUID", other)),
		}
	}
}
