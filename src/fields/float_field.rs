use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::Value;

/// Floating-point field; `nan` and `inf` spellings parse like any other float
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatField;

impl FieldType for FloatField {
	fn type_name(&self) -> &'static str {
		"float"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "A valid number is required.")]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		let parsed = match &data {
			Value::Float(f) => Some(*f),
			Value::Int(i) => Some(*i as f64),
			Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
			Value::String(s) => s.trim().parse::<f64>().ok(),
			_ => None,
		};
		parsed.map(Value::Float).ok_or_else(|| field.fail("invalid"))
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::Float(f) => Ok(Value::Float(*f)),
			Value::Int(i) => Ok(Value::Float(*i as f64)),
			other => Err(RepresentationError::unrepresentable("a number", other)),
		}
	}
}
