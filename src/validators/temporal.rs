//! Date and datetime validators
//!
//! Dates compared against datetimes are promoted to midnight UTC. Values
//! that are neither dates nor datetimes pass unchanged.

use super::{Validator, invalid};
use crate::dates::{date_to_datetime, safe_strftime};
use crate::errors::FieldResult;
use crate::field::Field;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, Utc};

fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
	match value {
		Value::Date(date) => Some(date_to_datetime(*date)),
		Value::DateTime(dt) => Some(*dt),
		_ => None,
	}
}

/// Reject dates after today and datetimes after now
pub fn not_in_future() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		let in_future = match &value {
			Value::Date(date) => *date > Utc::now().date_naive(),
			Value::DateTime(dt) => *dt > Utc::now(),
			_ => false,
		};
		if in_future {
			return Err(invalid("Can't be in the future."));
		}
		Ok(value)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
	After,
	Before,
}

/// Validator bounding a date or datetime on one side
#[derive(Debug, Clone)]
pub struct DateBound {
	bound: DateTime<Utc>,
	direction: Direction,
	format: Option<String>,
}

impl DateBound {
	fn message(&self, field: &Field) -> String {
		let format = self
			.format
			.as_deref()
			.unwrap_or(field.context().settings().human_date_format.as_str());
		let rendered = safe_strftime(&self.bound, format).unwrap_or_else(|err| {
			tracing::warn!(error = %err, format, "falling back to ISO date in validation message");
			self.bound.date_naive().to_string()
		});

		match self.direction {
			Direction::After => format!("Value is before {}.", rendered),
			Direction::Before => format!("Value is after {}.", rendered),
		}
	}
}

impl Validator for DateBound {
	fn validate(&self, value: Value, field: &Field) -> FieldResult<Value> {
		let Some(current) = as_datetime(&value) else {
			return Ok(value);
		};

		let out_of_bounds = match self.direction {
			Direction::After => current < self.bound,
			Direction::Before => current > self.bound,
		};
		if out_of_bounds {
			return Err(invalid(self.message(field)));
		}
		Ok(value)
	}
}

/// Bound accepted by [`after`] and [`before`]
pub trait IntoDateBound {
	fn into_bound(self) -> DateTime<Utc>;
}

impl IntoDateBound for NaiveDate {
	fn into_bound(self) -> DateTime<Utc> {
		date_to_datetime(self)
	}
}

impl IntoDateBound for DateTime<Utc> {
	fn into_bound(self) -> DateTime<Utc> {
		self
	}
}

/// Reject values earlier than `min`
///
/// `format` controls how the bound appears in the message; the configured
/// `human_date_format` is used when it is `None`.
pub fn after(min: impl IntoDateBound, format: Option<&str>) -> DateBound {
	DateBound {
		bound: min.into_bound(),
		direction: Direction::After,
		format: format.map(str::to_string),
	}
}

/// Reject values later than `max`
pub fn before(max: impl IntoDateBound, format: Option<&str>) -> DateBound {
	DateBound {
		bound: max.into_bound(),
		direction: Direction::Before,
		format: format.map(str::to_string),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Settings;
	use crate::context::{Context, Parent};
	use chrono::{Duration, TimeZone};
	use rstest::rstest;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[rstest]
	fn test_not_in_future() {
		// Arrange
		let field = Field::json();
		let today = Utc::now().date_naive();

		// Act & Assert
		assert!(not_in_future().validate(Value::from(today), &field).is_ok());
		assert!(not_in_future()
			.validate(Value::from(Utc::now() - Duration::seconds(5)), &field)
			.is_ok());
		assert_eq!(
			not_in_future().validate(Value::from(today + Duration::days(1)), &field),
			Err(invalid("Can't be in the future."))
		);
		assert!(not_in_future()
			.validate(Value::from(Utc::now() + Duration::hours(1)), &field)
			.is_err());
	}

	#[rstest]
	#[case(date(2001, 1, 1), true)]
	#[case(date(2001, 1, 2), true)]
	#[case(date(2000, 12, 31), false)]
	fn test_after_date(#[case] value: NaiveDate, #[case] ok: bool) {
		let result = after(date(2001, 1, 1), None).validate(Value::from(value), &Field::json());
		assert_eq!(result.is_ok(), ok);
	}

	#[rstest]
	fn test_after_message_uses_default_format() {
		let result = after(date(2001, 1, 1), None).validate(Value::from(date(2000, 1, 1)), &Field::json());
		assert_eq!(result, Err(invalid("Value is before 01/01/2001.")));
	}

	#[rstest]
	fn test_before_message_uses_explicit_format() {
		// Arrange
		let bound = Utc.with_ymd_and_hms(2001, 2, 3, 13, 0, 0).unwrap();
		let value = Value::from(Utc.with_ymd_and_hms(2001, 2, 3, 14, 0, 0).unwrap());

		// Act
		let result = before(bound, Some("%d %B %Y %H:%M")).validate(value, &Field::json());

		// Assert
		assert_eq!(result, Err(invalid("Value is after 03 February 2001 13:00.")));
	}

	#[rstest]
	fn test_date_compared_with_datetime_bound() {
		let bound = Utc.with_ymd_and_hms(2001, 1, 1, 12, 0, 0).unwrap();
		assert!(before(bound, None).validate(Value::from(date(2001, 1, 1)), &Field::json()).is_ok());
		assert!(after(bound, None).validate(Value::from(date(2001, 1, 1)), &Field::json()).is_err());
	}

	#[rstest]
	fn test_message_format_from_settings() {
		// Arrange
		let settings = Settings {
			human_date_format: "%Y-%m-%d".to_string(),
			..Settings::default()
		};
		let mut field = Field::date();
		field.bind(&Parent::root("Test", Context::new().with_settings(settings)), Some("d"));

		// Act
		let result = after(date(2001, 1, 1), None).validate(Value::from(date(2000, 1, 1)), &field);

		// Assert
		assert_eq!(result, Err(invalid("Value is before 2001-01-01.")));
	}

	#[rstest]
	fn test_non_temporal_values_pass() {
		assert!(after(date(2001, 1, 1), None).validate(Value::Int(1), &Field::json()).is_ok());
	}
}
