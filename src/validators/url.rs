//! URL shape validator

use super::{Validator, invalid};
use crate::errors::FieldResult;
use crate::value::Value;
use url::{ParseError, Url};

/// Require an absolute URL with a scheme and a network location
///
/// The value itself is returned unchanged.
pub fn url() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		let Value::String(raw) = &value else {
			return Err(invalid("No scheme."));
		};

		match Url::parse(raw) {
			Ok(parsed) if parsed.host_str().is_some_and(|host| !host.is_empty()) => Ok(value),
			Ok(_) => Err(invalid("No network location.")),
			Err(ParseError::RelativeUrlWithoutBase) => Err(invalid("No scheme.")),
			Err(err) => {
				tracing::trace!(error = %err, "url failed to parse");
				Err(invalid("No network location."))
			}
		}
	}
}
