//! String validators and transforms
//!
//! Transforms leave non-string values untouched.

use super::{Validator, invalid};
use crate::errors::FieldResult;
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static POSTCODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r"^(GIR ?0AA|((AB|AL|B|BA|BB|BD|BH|BL|BN|BR|BS|BT|BX|CA|CB|CF|CH|CM|CO|CR|CT|CV|CW|DA|DD|DE|DG|DH|DL|DN|DT|DY|E|EC|EH|EN|EX|FK|FY|G|GL|GY|GU|HA|HD|HG|HP|HR|HS|HU|HX|IG|IM|IP|IV|JE|KA|KT|KW|KY|L|LA|LD|LE|LL|LN|LS|LU|M|ME|MK|ML|N|NE|NG|NN|NP|NR|NW|OL|OX|PA|PE|PH|PL|PO|PR|RG|RH|RM|S|SA|SE|SG|SK|SL|SM|SN|SO|SP|SR|SS|ST|SW|SY|TA|TD|TF|TN|TQ|TR|TS|TW|UB|W|WA|WC|WD|WF|WN|WR|WS|WV|YO|ZE)",
		r"(\d[\dA-Z]? ?\d[ABD-HJLN-UW-Z]{2}))|BFPO ?\d{1,4})$",
	))
	.expect("POSTCODE_REGEX: invalid regex pattern")
});

static BFPO_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^BFPO ?(\d{1,4})$").expect("BFPO_REGEX: invalid regex pattern"));

static NON_ALPHANUMERIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[^A-Z0-9]").expect("NON_ALPHANUMERIC_REGEX: invalid regex pattern")
});

static MULTIPLE_WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\s{2,}").expect("MULTIPLE_WHITESPACE_REGEX: invalid regex pattern")
});

fn map_string(value: Value, f: impl Fn(&str) -> String) -> Value {
	match value {
		Value::String(s) => Value::String(f(&s)),
		other => other,
	}
}

/// Reject strings (or lists) longer than `limit`
pub fn max_length(limit: usize) -> impl Validator {
	move |value: Value| -> FieldResult<Value> {
		if value.len().is_some_and(|len| len > limit) {
			return Err(invalid(format!(
				"Value is too long (max length is {} characters).",
				limit
			)));
		}
		Ok(value)
	}
}

/// Reject strings (or lists) shorter than `limit`
pub fn min_length(limit: usize) -> impl Validator {
	move |value: Value| -> FieldResult<Value> {
		if value.len().is_some_and(|len| len < limit) {
			return Err(invalid(format!(
				"Value is too short (min length is {} characters).",
				limit
			)));
		}
		Ok(value)
	}
}

/// Tabs become spaces and runs of whitespace collapse to one space
pub fn normalise_whitespace() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		Ok(map_string(value, |s| {
			MULTIPLE_WHITESPACE_REGEX
				.replace_all(&s.replace('\t', " "), " ")
				.into_owned()
		}))
	}
}

pub fn upper() -> impl Validator {
	|value: Value| -> FieldResult<Value> { Ok(map_string(value, str::to_uppercase)) }
}

pub fn lower() -> impl Validator {
	|value: Value| -> FieldResult<Value> { Ok(map_string(value, str::to_lowercase)) }
}

/// UK postcode, normalised to upper case with a single separating space
///
/// BFPO numbers are accepted and formatted as `BFPO <number>`.
pub fn postcode() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		let Value::String(raw) = value else {
			return Err(invalid("Not a valid postcode."));
		};

		let compact = NON_ALPHANUMERIC_REGEX
			.replace_all(&raw.to_uppercase(), "")
			.into_owned();
		if !POSTCODE_REGEX.is_match(&compact) {
			return Err(invalid("Not a valid postcode."));
		}

		if let Some(caps) = BFPO_REGEX.captures(&compact) {
			return Ok(Value::String(format!("BFPO {}", &caps[1])));
		}
		let (outward, inward) = compact.split_at(compact.len() - 3);
		Ok(Value::String(format!("{} {}", outward, inward)))
	}
}
