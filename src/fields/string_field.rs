use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::Value;

/// Text field
///
/// Composite and boolean input is rejected; other scalars are coerced to
/// their text form.
#[derive(Debug, Clone)]
pub struct StringField {
	pub trim_whitespace: bool,
}

impl Default for StringField {
	fn default() -> Self {
		Self {
			trim_whitespace: true,
		}
	}
}

impl StringField {
	/// Keep surrounding whitespace
	pub fn untrimmed() -> Self {
		Self {
			trim_whitespace: false,
		}
	}
}

impl FieldType for StringField {
	fn type_name(&self) -> &'static str {
		"string"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "A valid string is required.")]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		if matches!(data, Value::Bool(_)) {
			return Err(field.fail("invalid"));
		}
		let Some(text) = data.to_text() else {
			return Err(field.fail("invalid"));
		};

		if self.trim_whitespace {
			Ok(Value::String(text.trim().to_string()))
		} else {
			Ok(Value::String(text))
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		value
			.to_text()
			.map(Value::String)
			.ok_or_else(|| RepresentationError::unrepresentable("a string", value))
	}
}
