//! Bound validators

use super::{Validator, invalid};
use crate::errors::FieldResult;
use crate::field::Field;
use crate::value::Value;

fn bound_text(bound: &Value, units: Option<&str>) -> String {
	match units {
		Some(units) => format!("{} {}", bound, units),
		None => bound.to_string(),
	}
}

/// Lower bound validator
#[derive(Debug, Clone)]
pub struct MinValue {
	min: Value,
	units: Option<String>,
}

impl MinValue {
	pub fn new(min: impl Into<Value>) -> Self {
		Self {
			min: min.into(),
			units: None,
		}
	}

	pub fn with_units(mut self, units: impl Into<String>) -> Self {
		self.units = Some(units.into());
		self
	}
}

impl Validator for MinValue {
	fn validate(&self, value: Value, _field: &Field) -> FieldResult<Value> {
		if value < self.min {
			return Err(invalid(format!(
				"Must be greater than or equal to {}.",
				bound_text(&self.min, self.units.as_deref())
			)));
		}
		Ok(value)
	}
}

/// Upper bound validator
#[derive(Debug, Clone)]
pub struct MaxValue {
	max: Value,
	units: Option<String>,
}

impl MaxValue {
	pub fn new(max: impl Into<Value>) -> Self {
		Self {
			max: max.into(),
			units: None,
		}
	}

	pub fn with_units(mut self, units: impl Into<String>) -> Self {
		self.units = Some(units.into());
		self
	}
}

impl Validator for MaxValue {
	fn validate(&self, value: Value, _field: &Field) -> FieldResult<Value> {
		if value > self.max {
			return Err(invalid(format!(
				"Must be less than or equal to {}.",
				bound_text(&self.max, self.units.as_deref())
			)));
		}
		Ok(value)
	}
}

/// Inclusive range; either side may be open
#[derive(Debug, Clone)]
pub struct Range {
	min: Option<MinValue>,
	max: Option<MaxValue>,
}

impl Validator for Range {
	fn validate(&self, value: Value, field: &Field) -> FieldResult<Value> {
		let value = match &self.min {
			Some(min) => min.validate(value, field)?,
			None => value,
		};
		match &self.max {
			Some(max) => max.validate(value, field),
			None => Ok(value),
		}
	}
}

/// Values below `bound` fail; values that cannot be compared pass
pub fn min(bound: impl Into<Value>, units: Option<&str>) -> MinValue {
	let validator = MinValue::new(bound);
	match units {
		Some(units) => validator.with_units(units),
		None => validator,
	}
}

/// Values above `bound` fail; values that cannot be compared pass
pub fn max(bound: impl Into<Value>, units: Option<&str>) -> MaxValue {
	let validator = MaxValue::new(bound);
	match units {
		Some(units) => validator.with_units(units),
		None => validator,
	}
}

pub fn range<T: Into<Value>>(min_value: Option<T>, max_value: Option<T>, units: Option<&str>) -> Range {
	Range {
		min: min_value.map(|bound| min(bound, units)),
		max: max_value.map(|bound| max(bound, units)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::errors::{FieldError, ValidationError};
	use rstest::rstest;

	fn message(result: FieldResult<Value>) -> String {
		match result {
			Err(FieldError::Invalid(ValidationError::Messages(messages))) => messages.join(" "),
			other => panic!("expected a single failure, got {:?}", other),
		}
	}

	#[rstest]
	#[case(Value::Int(0))]
	#[case(Value::Int(1))]
	#[case(Value::Float(0.5))]
	fn test_min_accepts(#[case] value: Value) {
		assert!(min(0, None).validate(value, &Field::json()).is_ok());
	}

	#[rstest]
	fn test_min_message() {
		let result = min(0, None).validate(Value::Int(-1), &Field::json());
		assert_eq!(message(result), "Must be greater than or equal to 0.");
	}

	#[rstest]
	fn test_min_message_with_units() {
		let result = min(10, Some("kg")).validate(Value::Float(9.5), &Field::json());
		assert_eq!(message(result), "Must be greater than or equal to 10 kg.");
	}

	#[rstest]
	#[case(Value::Int(-1))]
	#[case(Value::Int(0))]
	#[case(Value::Float(-0.5))]
	fn test_max_accepts(#[case] value: Value) {
		assert!(max(0, None).validate(value, &Field::json()).is_ok());
	}

	#[rstest]
	fn test_max_message() {
		let result = max(0, None).validate(Value::Int(1), &Field::json());
		assert_eq!(message(result), "Must be less than or equal to 0.");
	}

	#[rstest]
	#[case(Some(1), Some(10), Value::Int(5), true)]
	#[case(Some(1), Some(10), Value::Int(0), false)]
	#[case(Some(1), Some(10), Value::Int(11), false)]
	#[case(None, Some(10), Value::Int(-100), true)]
	#[case(Some(1), None, Value::Int(100), true)]
	fn test_range(
		#[case] lower: Option<i64>,
		#[case] upper: Option<i64>,
		#[case] value: Value,
		#[case] ok: bool,
	) {
		let result = range(lower, upper, None).validate(value, &Field::json());
		assert_eq!(result.is_ok(), ok);
	}

	#[rstest]
	fn test_incomparable_values_pass() {
		assert!(min(0, None).validate(Value::from("abc"), &Field::json()).is_ok());
	}
}
