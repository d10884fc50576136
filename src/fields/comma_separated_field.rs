use super::list_field::{represent_items, validate_items};
use crate::context::Parent;
use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::Value;

/// List of a child field, accepted either as a list or as one
/// comma-separated string
#[derive(Debug, Clone)]
pub struct CommaSeparatedField {
	child: Box<Field>,
}

impl CommaSeparatedField {
	pub fn new(child: Field) -> Self {
		Self {
			child: Box::new(child),
		}
	}
}

impl FieldType for CommaSeparatedField {
	fn type_name(&self) -> &'static str {
		"comma_separated"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "A valid string is required.")]
	}

	fn bind(&mut self, parent: &Parent) {
		self.child.bind(parent, None);
	}

	fn default_value(&self) -> Option<Value> {
		Some(Value::List(Vec::new()))
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match data {
			Value::List(items) => validate_items(&self.child, items),
			Value::String(s) if s.is_empty() => Ok(Value::List(Vec::new())),
			Value::String(s) => validate_items(&self.child, s.split(',').map(Value::from)),
			_ => Err(field.fail("invalid")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		let Value::List(items) = value else {
			return Err(RepresentationError::unrepresentable("a list", value));
		};

		let parts = represent_items(&self.child, items)?
			.iter()
			.map(|item| match item {
				Value::Null => Ok(String::new()),
				item => item
					.to_text()
					.ok_or_else(|| RepresentationError::unrepresentable("text", item)),
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Value::String(parts.join(",")))
	}
}
