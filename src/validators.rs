//! Validator pipeline functions
//!
//! A validator takes the converted value and returns it, possibly
//! transformed, or fails with a [`ValidationError`]. Returning
//! [`FieldError::Skip`] stops the remaining pipeline without an error.
//!
//! Plain closures `Fn(Value) -> FieldResult<Value>` are validators. Use
//! [`with_context`] for a validator that needs the owning field, e.g. to read
//! the request-scoped [`Context`](crate::Context).
//!
//! ```
//! use reinhardt_marshal::{validators, Field, Value};
//!
//! let field = Field::integer()
//!     .with_validator(validators::range(Some(1), Some(10), Some("days")));
//!
//! assert!(field.run_validation(Some(Value::from("5"))).is_ok());
//! let err = field.run_validation(Some(Value::from("11"))).unwrap_err();
//! assert_eq!(err.to_string(), r#"["Must be less than or equal to 10 days."]"#);
//! ```

pub mod email;
pub mod html;
pub mod numeric;
pub mod string;
pub mod temporal;
pub mod url;

pub use email::email_address;
pub use html::sanitize_html;
pub use numeric::{max, min, range};
pub use string::{lower, max_length, min_length, normalise_whitespace, postcode, upper};
pub use temporal::{after, before, not_in_future};
pub use url::url;

use crate::errors::{FieldError, FieldResult, ValidationError};
use crate::field::Field;
use crate::value::Value;
use chrono::Utc;

/// One step of a field's validator pipeline
pub trait Validator: Send + Sync {
	fn validate(&self, value: Value, field: &Field) -> FieldResult<Value>;
}

impl<F> Validator for F
where
	F: Fn(Value) -> FieldResult<Value> + Send + Sync,
{
	fn validate(&self, value: Value, _field: &Field) -> FieldResult<Value> {
		self(value)
	}
}

/// Validator that receives the owning field on every call
pub struct ContextValidator<F>(F);

impl<F> Validator for ContextValidator<F>
where
	F: Fn(Value, &Field) -> FieldResult<Value> + Send + Sync,
{
	fn validate(&self, value: Value, field: &Field) -> FieldResult<Value> {
		(self.0)(value, field)
	}
}

/// Wrap a validator that needs access to the owning field and its context
pub fn with_context<F>(validator: F) -> ContextValidator<F>
where
	F: Fn(Value, &Field) -> FieldResult<Value> + Send + Sync,
{
	ContextValidator(validator)
}

pub(crate) fn invalid(message: impl Into<String>) -> FieldError {
	FieldError::Invalid(ValidationError::message(message))
}

/// Reject null
pub fn required() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		if value.is_null() {
			return Err(invalid("This field is required."));
		}
		Ok(value)
	}
}

/// Stop the pipeline, without error, when the value is null
pub fn optional() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		if value.is_null() {
			return Err(FieldError::Skip);
		}
		Ok(value)
	}
}

/// Turn an empty string, list or mapping into null
pub fn none_if_blank() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		if value.is_empty() {
			return Ok(Value::Null);
		}
		Ok(value)
	}
}

/// Reject null and empty strings, lists or mappings
pub fn not_empty() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		if value.is_null() || value.is_empty() {
			return Err(invalid("This field is required."));
		}
		Ok(value)
	}
}

/// Accept only members of `values`
pub fn in_<I, V>(values: I) -> impl Validator
where
	I: IntoIterator<Item = V>,
	V: Into<Value>,
{
	let values: Vec<Value> = values.into_iter().map(Into::into).collect();
	move |value: Value| -> FieldResult<Value> {
		if !values.contains(&value) {
			return Err(invalid("Not a valid value."));
		}
		Ok(value)
	}
}

/// Replace null with `default`
pub fn default(default: impl Into<Value>) -> impl Validator {
	let default = default.into();
	move |value: Value| -> FieldResult<Value> {
		if value.is_null() {
			return Ok(default.clone());
		}
		Ok(value)
	}
}

/// Replace null with the value produced by `factory`
pub fn default_with<F>(factory: F) -> impl Validator
where
	F: Fn() -> Value + Send + Sync,
{
	move |value: Value| -> FieldResult<Value> {
		if value.is_null() {
			return Ok(factory());
		}
		Ok(value)
	}
}

/// Replace null with the current UTC time
pub fn default_now() -> impl Validator {
	default_with(|| Value::DateTime(Utc::now()))
}
