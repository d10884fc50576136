//! Email address validator

use super::{Validator, invalid};
use crate::errors::FieldResult;
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\S+@[^.@\s][^@]*\.[^.@\s]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

static EMAIL_WITH_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^.* <\S+@[^.@\s][^@]*\.[^.@\s]+>$")
		.expect("EMAIL_WITH_NAME_REGEX: invalid regex pattern")
});

/// Lower-cased email address
///
/// With `allow_name`, the `Display Name <user@example.com>` form is accepted
/// too.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{validators, Field, Value};
///
/// let field = Field::string().with_validator(validators::email_address(false));
/// assert_eq!(
///     field.run_validation(Some(Value::from("Bob@Example.COM"))).unwrap(),
///     Value::from("bob@example.com")
/// );
/// assert!(field.run_validation(Some(Value::from("bob@example"))).is_err());
/// ```
pub fn email_address(allow_name: bool) -> impl Validator {
	move |value: Value| -> FieldResult<Value> {
		let Value::String(raw) = value else {
			return Err(invalid("Not a valid email address."));
		};

		let address = raw.to_lowercase();
		let valid = EMAIL_REGEX.is_match(&address)
			|| (allow_name && EMAIL_WITH_NAME_REGEX.is_match(&address));
		if !valid {
			return Err(invalid("Not a valid email address."));
		}
		Ok(Value::String(address))
	}
}
