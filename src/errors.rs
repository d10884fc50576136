//! Validation error tree and the error types surrounding it
//!
//! [`ValidationError`] is the single channel for validation failure. Its
//! shape is always canonical: leaves are non-empty sequences of messages and
//! composites are either mappings (keyed by field name or list index) or
//! sequences of nested errors.

use crate::config::ConfigError;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Reserved key holding errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "_";

/// One step of an error path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
	Key(String),
	Index(usize),
}

impl From<&str> for PathSegment {
	fn from(key: &str) -> Self {
		PathSegment::Key(key.to_string())
	}
}

impl From<String> for PathSegment {
	fn from(key: String) -> Self {
		PathSegment::Key(key)
	}
}

impl From<usize> for PathSegment {
	fn from(index: usize) -> Self {
		PathSegment::Index(index)
	}
}

impl fmt::Display for PathSegment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathSegment::Key(k) => write!(f, "{}", k),
			PathSegment::Index(i) => write!(f, "{}", i),
		}
	}
}

impl Serialize for PathSegment {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			PathSegment::Key(k) => serializer.serialize_str(k),
			PathSegment::Index(i) => serializer.serialize_u64(*i as u64),
		}
	}
}

/// Path from the root of an error tree to a leaf message
pub type ErrorPath = Vec<PathSegment>;

/// Hierarchical validation failure
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{PathSegment, ValidationError};
/// use serde_json::json;
///
/// let errors = ValidationError::from(json!({"a": {"b": ["m1", "m2"]}, "c": "m3"}));
///
/// let (path, message) = errors.first().unwrap();
/// assert_eq!(path, vec![PathSegment::from("a"), PathSegment::from("b")]);
/// assert_eq!(message, "m1");
/// assert_eq!(errors.flatten().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
	/// Leaf: ordered messages
	Messages(Vec<String>),
	/// Errors keyed by field name or list index
	Map(IndexMap<PathSegment, ValidationError>),
	/// Positional errors
	List(Vec<ValidationError>),
}

impl ValidationError {
	/// Single-message leaf
	pub fn message(message: impl Into<String>) -> Self {
		ValidationError::Messages(vec![message.into()])
	}

	pub fn messages<I, S>(messages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		ValidationError::Messages(messages.into_iter().map(Into::into).collect())
	}

	pub fn map<I, K>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, ValidationError)>,
		K: Into<PathSegment>,
	{
		ValidationError::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}

	/// Convert an arbitrary nested JSON structure into the canonical shape
	///
	/// Scalars become one-element message sequences, sequences made only of
	/// scalars become a message leaf, and nested structures are normalised
	/// recursively with mapping order preserved.
	pub fn normalise(raw: &serde_json::Value) -> Self {
		use serde_json::Value as Json;

		match raw {
			Json::Object(entries) => ValidationError::Map(
				entries
					.iter()
					.map(|(k, v)| (PathSegment::Key(k.clone()), Self::normalise(v)))
					.collect(),
			),
			Json::Array(items) if items.iter().all(is_scalar) => {
				ValidationError::Messages(items.iter().map(scalar_text).collect())
			}
			Json::Array(items) => ValidationError::List(items.iter().map(Self::normalise).collect()),
			scalar => ValidationError::Messages(vec![scalar_text(scalar)]),
		}
	}

	pub fn is_mapping(&self) -> bool {
		matches!(self, ValidationError::Map(_))
	}

	/// Place a non-mapping error under the reserved `_` key
	pub fn into_mapping(self) -> Self {
		if self.is_mapping() {
			self
		} else {
			ValidationError::map([(NON_FIELD_ERRORS, self)])
		}
	}

	/// Entry for `key` when this error is a mapping
	pub fn get(&self, key: impl Into<PathSegment>) -> Option<&ValidationError> {
		match self {
			ValidationError::Map(entries) => entries.get(&key.into()),
			_ => None,
		}
	}

	/// Path and message of the first leaf in depth-first order
	pub fn first(&self) -> Option<(ErrorPath, String)> {
		match self {
			ValidationError::Messages(messages) => {
				messages.first().map(|m| (Vec::new(), m.clone()))
			}
			ValidationError::Map(entries) => entries.iter().find_map(|(key, child)| {
				child.first().map(|(mut path, message)| {
					path.insert(0, key.clone());
					(path, message)
				})
			}),
			ValidationError::List(items) => items.iter().enumerate().find_map(|(i, child)| {
				child.first().map(|(mut path, message)| {
					path.insert(0, PathSegment::Index(i));
					(path, message)
				})
			}),
		}
	}

	/// Every leaf message together with its path
	pub fn flatten(&self) -> Vec<(ErrorPath, String)> {
		let mut out = Vec::new();
		self.flatten_into(&mut Vec::new(), &mut out);
		out
	}

	fn flatten_into(&self, prefix: &mut ErrorPath, out: &mut Vec<(ErrorPath, String)>) {
		match self {
			ValidationError::Messages(messages) => {
				out.extend(messages.iter().map(|m| (prefix.clone(), m.clone())));
			}
			ValidationError::Map(entries) => {
				for (key, child) in entries {
					prefix.push(key.clone());
					child.flatten_into(prefix, out);
					prefix.pop();
				}
			}
			ValidationError::List(items) => {
				for (i, child) in items.iter().enumerate() {
					prefix.push(PathSegment::Index(i));
					child.flatten_into(prefix, out);
					prefix.pop();
				}
			}
		}
	}

	/// Render as a JSON structure
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			ValidationError::Messages(messages) => {
				serde_json::Value::Array(messages.iter().cloned().map(Into::into).collect())
			}
			ValidationError::Map(entries) => serde_json::Value::Object(
				entries
					.iter()
					.map(|(k, v)| (k.to_string(), v.to_json()))
					.collect(),
			),
			ValidationError::List(items) => {
				serde_json::Value::Array(items.iter().map(Self::to_json).collect())
			}
		}
	}
}

fn is_scalar(value: &serde_json::Value) -> bool {
	!matches!(value, serde_json::Value::Array(_) | serde_json::Value::Object(_))
}

fn scalar_text(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

impl From<serde_json::Value> for ValidationError {
	fn from(raw: serde_json::Value) -> Self {
		Self::normalise(&raw)
	}
}

impl From<&str> for ValidationError {
	fn from(message: &str) -> Self {
		Self::message(message)
	}
}

impl From<String> for ValidationError {
	fn from(message: String) -> Self {
		Self::message(message)
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_json())
	}
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			ValidationError::Messages(messages) => messages.serialize(serializer),
			ValidationError::Map(entries) => {
				let mut map = serializer.serialize_map(Some(entries.len()))?;
				for (k, v) in entries {
					map.serialize_entry(k, v)?;
				}
				map.end()
			}
			ValidationError::List(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
		}
	}
}

/// Outcome of a failed field operation
///
/// `Skip` is not a failure: it abandons the remaining pipeline for a field
/// and keeps whatever was resolved so far (or omits the field entirely when
/// raised by a composite's child).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
	#[error("{0}")]
	Invalid(ValidationError),
	#[error("field skipped")]
	Skip,
}

impl From<ValidationError> for FieldError {
	fn from(error: ValidationError) -> Self {
		FieldError::Invalid(error)
	}
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Failure while rendering a value for output
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepresentationError {
	#[error("'{type_name}' object has no attribute '{attribute}'")]
	MissingAttribute {
		attribute: String,
		type_name: String,
	},
	#[error("cannot read '{attribute}' from a {kind} value")]
	NotAnObject { attribute: String, kind: &'static str },
	#[error("cannot render a {kind} value as {expected}")]
	Unrepresentable {
		expected: &'static str,
		kind: &'static str,
	},
	#[error("field '{field}': {source}")]
	Field {
		field: String,
		#[source]
		source: Box<RepresentationError>,
	},
	#[error("{0}")]
	Other(String),
}

impl RepresentationError {
	pub fn unrepresentable(expected: &'static str, value: &crate::Value) -> Self {
		RepresentationError::Unrepresentable {
			expected,
			kind: value.kind(),
		}
	}

	/// Attach the name of the field the failure happened in
	pub fn in_field(self, field: impl Into<String>) -> Self {
		RepresentationError::Field {
			field: field.into(),
			source: Box::new(self),
		}
	}
}

/// Caller-facing serializer error
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
	#[error("validation failed: {0}")]
	Validation(ValidationError),
	#[error(transparent)]
	Representation(#[from] RepresentationError),
	#[error("is_valid() must be called successfully before this operation")]
	NotValidated,
	#[error("{schema} does not implement {operation}()")]
	NotImplemented {
		schema: String,
		operation: &'static str,
	},
	#[error("save failed: {0}")]
	Save(String),
	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl From<ValidationError> for SerializerError {
	fn from(error: ValidationError) -> Self {
		SerializerError::Validation(error)
	}
}

impl SerializerError {
	pub fn not_implemented(schema: impl Into<String>, operation: &'static str) -> Self {
		SerializerError::NotImplemented {
			schema: schema.into(),
			operation,
		}
	}
}
