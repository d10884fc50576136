//! Dynamic value tree
//!
//! Fields operate on already-decoded, in-memory structures. [`Value`] is the
//! single currency flowing through every conversion: raw input, validated
//! internal values and rendered representations are all `Value`s.
//!
//! Domain objects participate through the [`Entity`] trait, which gives
//! fields attribute-style access next to the mapping-style access offered by
//! [`Value::Map`].

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Insertion-ordered string-keyed mapping
pub type Map = IndexMap<String, Value>;

/// A domain object exposing named attributes
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{Entity, Value};
/// use std::any::Any;
///
/// #[derive(Debug)]
/// struct Patient {
///     name: String,
/// }
///
/// impl Entity for Patient {
///     fn attribute(&self, name: &str) -> Option<Value> {
///         match name {
///             "name" => Some(Value::from(self.name.as_str())),
///             _ => None,
///         }
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let value = Value::entity(Patient { name: "Alice".to_string() });
/// assert_eq!(value.as_entity().unwrap().attribute("name"), Some(Value::from("Alice")));
/// ```
pub trait Entity: fmt::Debug + Send + Sync + 'static {
	/// Read the attribute `name`, or `None` if the object has no such attribute
	fn attribute(&self, name: &str) -> Option<Value>;

	fn as_any(&self) -> &dyn Any;

	/// Runtime type name, used for dispatch and error messages
	fn type_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}
}

/// A member of a closed enumeration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
	/// Type name of the enumeration the member belongs to
	pub enumeration: &'static str,
	/// Member name
	pub name: &'static str,
	/// Underlying value rendered on output
	pub value: Box<Value>,
}

impl EnumMember {
	pub fn new(enumeration: &'static str, name: &'static str, value: Value) -> Self {
		Self {
			enumeration,
			name,
			value: Box::new(value),
		}
	}
}

/// Dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Date(NaiveDate),
	/// Timezone-aware datetime, normalised to UTC
	DateTime(DateTime<Utc>),
	Uuid(Uuid),
	Enum(EnumMember),
	List(Vec<Value>),
	Map(Map),
	Entity(Arc<dyn Entity>),
}

impl Value {
	/// Wrap a domain object
	pub fn entity<E: Entity>(entity: E) -> Self {
		Value::Entity(Arc::new(entity))
	}

	/// Empty mapping
	pub fn empty_map() -> Self {
		Value::Map(Map::new())
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&Map> {
		match self {
			Value::Map(m) => Some(m),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_entity(&self) -> Option<&Arc<dyn Entity>> {
		match self {
			Value::Entity(e) => Some(e),
			_ => None,
		}
	}

	/// Short name of the variant, used in error messages
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::String(_) => "string",
			Value::Date(_) => "date",
			Value::DateTime(_) => "datetime",
			Value::Uuid(_) => "uuid",
			Value::Enum(_) => "enum",
			Value::List(_) => "list",
			Value::Map(_) => "map",
			Value::Entity(_) => "entity",
		}
	}

	/// Key lookup for mappings
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_map().and_then(|m| m.get(key))
	}

	/// Number of characters, items or entries
	pub fn len(&self) -> Option<usize> {
		match self {
			Value::String(s) => Some(s.chars().count()),
			Value::List(items) => Some(items.len()),
			Value::Map(m) => Some(m.len()),
			_ => None,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == Some(0)
	}

	/// String coercion for scalar values
	///
	/// Composites, entities and null have no text form.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_marshal::Value;
	///
	/// assert_eq!(Value::Int(123).to_text(), Some("123".to_string()));
	/// assert_eq!(Value::Float(123.456).to_text(), Some("123.456".to_string()));
	/// assert_eq!(Value::Float(1.0).to_text(), Some("1.0".to_string()));
	/// assert_eq!(Value::List(vec![]).to_text(), None);
	/// ```
	pub fn to_text(&self) -> Option<String> {
		match self {
			Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
			Value::Int(i) => Some(i.to_string()),
			Value::Float(f) => Some(format_float(*f)),
			Value::String(s) => Some(s.clone()),
			Value::Date(d) => Some(format_date(d)),
			Value::DateTime(dt) => Some(format_datetime(dt)),
			Value::Uuid(u) => Some(u.hyphenated().to_string()),
			Value::Enum(m) => m.value.to_text(),
			Value::Null | Value::List(_) | Value::Map(_) | Value::Entity(_) => None,
		}
	}

	/// Convert into a `serde_json::Value`
	///
	/// Entities cannot be converted; render them through a serializer first.
	pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
		serde_json::to_value(self)
	}

	fn compare(&self, other: &Value) -> Option<Ordering> {
		match (self, other) {
			(Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
			(Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
			(Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
			(Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
			(Value::String(a), Value::String(b)) => Some(a.cmp(b)),
			(Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
			(Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
			(Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
			(Value::Enum(a), Value::Enum(b)) if a.enumeration == b.enumeration => {
				a.value.compare(&b.value)
			}
			_ => None,
		}
	}
}

/// ISO-8601 calendar date with the year zero-padded to four digits
pub fn format_date(date: &NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

/// Shortest round-trip text for a float
///
/// Integral values keep a trailing `.0`; exponents below -4 or from 16 up
/// switch to scientific form with a signed, two-digit exponent (`1e+21`).
pub fn format_float(f: f64) -> String {
	if f.is_nan() {
		return "nan".to_string();
	}
	if f.is_infinite() {
		return if f > 0.0 { "inf" } else { "-inf" }.to_string();
	}

	let scientific = format!("{:e}", f);
	let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
	let exponent: i32 = exponent.parse().unwrap_or(0);
	if f != 0.0 && !(-4..16).contains(&exponent) {
		let sign = if exponent < 0 { '-' } else { '+' };
		return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
	}

	let plain = f.to_string();
	if plain.contains('.') { plain } else { format!("{}.0", plain) }
}

/// ISO-8601 datetime with an explicit `+00:00` offset
///
/// Sub-second values always carry six fractional digits.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
	let precision = if dt.timestamp_subsec_nanos() == 0 {
		SecondsFormat::Secs
	} else {
		SecondsFormat::Micros
	};
	dt.to_rfc3339_opts(precision, false)
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
				(*a as f64) == *b
			}
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Date(a), Value::Date(b)) => a == b,
			(Value::DateTime(a), Value::DateTime(b)) => a == b,
			(Value::Uuid(a), Value::Uuid(b)) => a == b,
			(Value::Enum(a), Value::Enum(b)) => a == b,
			(Value::List(a), Value::List(b)) => a == b,
			(Value::Map(a), Value::Map(b)) => a == b,
			(Value::Entity(a), Value::Entity(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
			_ => false,
		}
	}
}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.compare(other)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Entity(e) => write!(f, "<{}>", e.type_name()),
			Value::List(_) | Value::Map(_) => match serde_json::to_string(self) {
				Ok(s) => write!(f, "{}", s),
				Err(_) => write!(f, "<{}>", self.kind()),
			},
			other => match other.to_text() {
				Some(text) => write!(f, "{}", text),
				None => write!(f, "<{}>", other.kind()),
			},
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Value::Null => serializer.serialize_unit(),
			Value::Bool(b) => serializer.serialize_bool(*b),
			Value::Int(i) => serializer.serialize_i64(*i),
			Value::Float(f) => serializer.serialize_f64(*f),
			Value::String(s) => serializer.serialize_str(s),
			Value::Date(d) => serializer.serialize_str(&format_date(d)),
			Value::DateTime(dt) => serializer.serialize_str(&format_datetime(dt)),
			Value::Uuid(u) => serializer.serialize_str(&u.hyphenated().to_string()),
			Value::Enum(m) => m.value.serialize(serializer),
			Value::List(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Value::Map(entries) => {
				let mut map = serializer.serialize_map(Some(entries.len()))?;
				for (k, v) in entries {
					map.serialize_entry(k, v)?;
				}
				map.end()
			}
			Value::Entity(e) => Err(S::Error::custom(format!(
				"entity '{}' must be rendered through a serializer",
				e.type_name()
			))),
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::Int(i),
				None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(s) => Value::String(s),
			serde_json::Value::Array(items) => {
				Value::List(items.into_iter().map(Value::from).collect())
			}
			serde_json::Value::Object(entries) => Value::Map(
				entries
					.into_iter()
					.map(|(k, v)| (k, Value::from(v)))
					.collect(),
			),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<NaiveDate> for Value {
	fn from(value: NaiveDate) -> Self {
		Value::Date(value)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Value::DateTime(value)
	}
}

impl From<Uuid> for Value {
	fn from(value: Uuid) -> Self {
		Value::Uuid(value)
	}
}

impl From<EnumMember> for Value {
	fn from(value: EnumMember) -> Self {
		Value::Enum(value)
	}
}

impl From<Map> for Value {
	fn from(value: Map) -> Self {
		Value::Map(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::List(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Value::Null)
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[derive(Debug)]
	struct Thing;

	impl Entity for Thing {
		fn attribute(&self, name: &str) -> Option<Value> {
			(name == "a").then(|| Value::from("b"))
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	#[rstest]
	fn test_from_json_preserves_key_order() {
		// Arrange
		let raw = json!({"z": 1, "a": [true, null], "m": {"x": 1.5}});

		// Act
		let value = Value::from(raw);

		// Assert
		let map = value.as_map().unwrap();
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
		assert_eq!(map["a"], Value::List(vec![Value::Bool(true), Value::Null]));
		assert_eq!(map["m"].get("x"), Some(&Value::Float(1.5)));
	}

	#[rstest]
	#[case(1.0, "1.0")]
	#[case(-0.0, "-0.0")]
	#[case(123.456, "123.456")]
	#[case(0.0001, "0.0001")]
	#[case(0.00001, "1e-05")]
	#[case(1e15, "1000000000000000.0")]
	#[case(1e16, "1e+16")]
	#[case(1.5e300, "1.5e+300")]
	#[case(f64::NEG_INFINITY, "-inf")]
	#[case(f64::NAN, "nan")]
	fn test_format_float(#[case] input: f64, #[case] expected: &str) {
		assert_eq!(format_float(input), expected);
	}

	#[rstest]
	#[case(0, "2024-03-01T12:30:05+00:00")]
	#[case(500_000_000, "2024-03-01T12:30:05.500000+00:00")]
	#[case(123_456_789, "2024-03-01T12:30:05.123456+00:00")]
	fn test_format_datetime_fraction(#[case] nanos: u32, #[case] expected: &str) {
		// Arrange
		let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
			.and_then(|d| d.and_hms_nano_opt(12, 30, 5, nanos))
			.unwrap()
			.and_utc();

		// Act
		let text = format_datetime(&dt);

		// Assert
		assert_eq!(text, expected);
	}

	#[rstest]
	fn test_int_float_equality() {
		assert_eq!(Value::Int(123), Value::Float(123.0));
		assert_ne!(Value::Int(123), Value::Float(123.5));
		assert_ne!(Value::Int(1), Value::Bool(true));
	}

	#[rstest]
	#[case(Value::Int(1), Value::Int(2))]
	#[case(Value::Int(1), Value::Float(1.5))]
	#[case(Value::from("a"), Value::from("b"))]
	#[case(
		Value::from(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()),
		Value::from(NaiveDate::from_ymd_opt(2001, 1, 2).unwrap())
	)]
	fn test_ordering(#[case] lower: Value, #[case] higher: Value) {
		assert!(lower < higher);
		assert!(higher > lower);
	}

	#[rstest]
	fn test_mixed_kinds_are_unordered() {
		assert_eq!(Value::Int(1).partial_cmp(&Value::from("1")), None);
	}

	#[rstest]
	fn test_serialize_typed_scalars() {
		// Arrange
		let value: Value = [
			("date", Value::from(NaiveDate::from_ymd_opt(999, 1, 1).unwrap())),
			(
				"uuid",
				Value::from(Uuid::parse_str("8EFA76C7-4E42-4424-83BB-FBBC4F758AD1").unwrap()),
			),
			(
				"member",
				Value::from(EnumMember::new("Colour", "Red", Value::from("red"))),
			),
		]
		.into_iter()
		.collect();

		// Act
		let json = value.to_json().unwrap();

		// Assert
		assert_eq!(
			json,
			json!({
				"date": "0999-01-01",
				"uuid": "8efa76c7-4e42-4424-83bb-fbbc4f758ad1",
				"member": "red",
			})
		);
	}

	#[rstest]
	fn test_entity_cannot_be_serialized_directly() {
		let value = Value::entity(Thing);
		assert!(value.to_json().is_err());
	}

	#[rstest]
	fn test_entity_equality_is_identity() {
		let a = Value::entity(Thing);
		let b = a.clone();
		assert_eq!(a, b);
		assert_ne!(a, Value::entity(Thing));
	}

	#[rstest]
	fn test_len_counts_characters() {
		assert_eq!(Value::from("héllo").len(), Some(5));
		assert_eq!(Value::Int(5).len(), None);
		assert!(Value::List(vec![]).is_empty());
	}
}
