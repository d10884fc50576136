use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::Value;

/// Whole-number field
///
/// Strings are trimmed before parsing. Input whose float interpretation
/// differs from its integer interpretation (e.g. `"1.5"` or `1.5`) is
/// rejected rather than truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerField;

fn integral(f: f64) -> Option<i64> {
	if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
		Some(f as i64)
	} else {
		None
	}
}

impl FieldType for IntegerField {
	fn type_name(&self) -> &'static str {
		"integer"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "A valid integer is required.")]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		let parsed = match &data {
			Value::Int(i) => Some(*i),
			Value::Bool(b) => Some(i64::from(*b)),
			Value::Float(f) => integral(*f),
			Value::String(s) => s.trim().parse::<i64>().ok(),
			_ => None,
		};
		parsed.map(Value::Int).ok_or_else(|| field.fail("invalid"))
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::Int(i) => Ok(Value::Int(*i)),
			Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
			Value::Float(f) => integral(*f)
				.map(Value::Int)
				.ok_or_else(|| RepresentationError::unrepresentable("an integer", value)),
			other => Err(RepresentationError::unrepresentable("an integer", other)),
		}
	}
}
