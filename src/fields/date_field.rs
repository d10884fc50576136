use crate::dates::parse_date;
use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::{Value, format_date};

/// Calendar date field
///
/// Strings go through the permissive date parser; an already-typed datetime
/// is rejected with its own message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateField;

impl FieldType for DateField {
	fn type_name(&self) -> &'static str {
		"date"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[
			("invalid", "Invalid date format."),
			("datetime", "Expected a date but got a datetime."),
		]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match data {
			Value::Date(date) => Ok(Value::Date(date)),
			Value::DateTime(_) => Err(field.fail("datetime")),
			Value::String(s) => {
				let formats = &field.context().settings().date_input_formats;
				parse_date(&s, formats)
					.map(Value::Date)
					.ok_or_else(|| field.fail("invalid"))
			}
			_ => Err(field.fail("invalid")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::Date(date) => Ok(Value::String(format_date(date))),
			Value::DateTime(dt) => Ok(Value::String(format_date(&dt.date_naive()))),
			other => Err(RepresentationError::unrepresentable("a date", other)),
		}
	}
}
