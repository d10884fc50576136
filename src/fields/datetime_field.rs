use crate::dates::parse_datetime;
use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::{Value, format_datetime};

/// Timezone-aware datetime field, normalised to UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeField;

impl FieldType for DateTimeField {
	fn type_name(&self) -> &'static str {
		"datetime"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[
			("invalid", "Invalid datetime format."),
			("date", "Expected a datetime but got a date."),
		]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match data {
			Value::DateTime(dt) => Ok(Value::DateTime(dt)),
			Value::Date(_) => Err(field.fail("date")),
			Value::String(s) => {
				let formats = &field.context().settings().datetime_input_formats;
				parse_datetime(&s, formats)
					.map(Value::DateTime)
					.ok_or_else(|| field.fail("invalid"))
			}
			_ => Err(field.fail("invalid")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::DateTime(dt) => Ok(Value::String(format_datetime(dt))),
			other => Err(RepresentationError::unrepresentable("a datetime", other)),
		}
	}
}
