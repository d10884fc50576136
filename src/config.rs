//! Marshalling settings
//!
//! Settings travel inside the [`Context`](crate::Context) of a serializer
//! tree, so every bound field sees the same message overrides and parsing
//! formats.
//!
//! ```toml
//! human_date_format = "%d %B %Y"
//! date_input_formats = ["%d/%m/%Y"]
//!
//! [error_messages]
//! required = "Please supply a value."
//! "integer.invalid" = "Whole numbers only."
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid TOML settings: {0}")]
	Toml(#[from] toml::de::Error),
	#[error("invalid JSON settings: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Message overrides keyed by `"<kind>"` or `"<field type>.<kind>"`
	pub error_messages: IndexMap<String, String>,
	/// Extra chrono formats tried after the built-in date formats
	pub date_input_formats: Vec<String>,
	/// Extra chrono formats tried after the built-in datetime formats
	pub datetime_input_formats: Vec<String>,
	/// Format used by date comparison validators when none is given
	pub human_date_format: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			error_messages: IndexMap::new(),
			date_input_formats: Vec::new(),
			datetime_input_formats: Vec::new(),
			human_date_format: "%d/%m/%Y".to_string(),
		}
	}
}

impl Settings {
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn from_json(source: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(source)?)
	}

	/// Override the message for `key` (either `"<kind>"` or `"<type>.<kind>"`)
	pub fn with_error_message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
		self.error_messages.insert(key.into(), message.into());
		self
	}

	/// Configured message for `kind` raised by a field of `type_name`
	pub fn error_message(&self, type_name: &str, kind: &str) -> Option<&str> {
		self.error_messages
			.get(&format!("{}.{}", type_name, kind))
			.or_else(|| self.error_messages.get(kind))
			.map(String::as_str)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let settings = Settings::default();
		assert_eq!(settings.human_date_format, "%d/%m/%Y");
		assert!(settings.error_messages.is_empty());
	}

	#[rstest]
	fn test_from_toml() {
		// Arrange
		let source = r#"
human_date_format = "%d %B %Y"
date_input_formats = ["%d/%m/%Y"]

[error_messages]
required = "Please supply a value."
"integer.invalid" = "Whole numbers only."
"#;

		// Act
		let settings = Settings::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(settings.human_date_format, "%d %B %Y");
		assert_eq!(settings.date_input_formats, vec!["%d/%m/%Y"]);
		assert_eq!(
			settings.error_message("integer", "invalid"),
			Some("Whole numbers only.")
		);
		assert_eq!(
			settings.error_message("string", "required"),
			Some("Please supply a value.")
		);
		assert_eq!(settings.error_message("string", "invalid"), None);
	}

	#[rstest]
	fn test_from_json_partial() {
		// Act
		let settings = Settings::from_json(r#"{"datetime_input_formats": ["%d/%m/%Y %H:%M"]}"#).unwrap();

		// Assert
		assert_eq!(settings.datetime_input_formats.len(), 1);
		assert_eq!(settings.human_date_format, "%d/%m/%Y");
	}

	#[rstest]
	fn test_invalid_toml() {
		let result = Settings::from_toml_str("human_date_format = 3");
		assert!(matches!(result, Err(ConfigError::Toml(_))));
	}
}
