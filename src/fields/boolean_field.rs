use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::Value;

const TRUE_VALUES: &[&str] = &["t", "true", "y", "yes", "1"];
const FALSE_VALUES: &[&str] = &["f", "false", "n", "no", "0"];

/// Boolean field accepting common truthy and falsy tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanField;

impl FieldType for BooleanField {
	fn type_name(&self) -> &'static str {
		"boolean"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "A valid boolean is required.")]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match data {
			Value::Bool(b) => Ok(Value::Bool(b)),
			Value::Int(1) => Ok(Value::Bool(true)),
			Value::Int(0) => Ok(Value::Bool(false)),
			Value::String(s) => {
				let token = s.to_lowercase();
				if TRUE_VALUES.contains(&token.as_str()) {
					Ok(Value::Bool(true))
				} else if FALSE_VALUES.contains(&token.as_str()) {
					Ok(Value::Bool(false))
				} else {
					Err(field.fail("invalid"))
				}
			}
			_ => Err(field.fail("invalid")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::Bool(b) => Ok(Value::Bool(*b)),
			Value::Int(i) => Ok(Value::Bool(*i != 0)),
			other => Err(RepresentationError::unrepresentable("a boolean", other)),
		}
	}
}
