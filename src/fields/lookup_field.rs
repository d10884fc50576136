use super::{Choice, EnumField, IntegerField, StringField};
use crate::context::Parent;
use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::{Map, Value};

/// Foreign-key-like field validated against a fixed set of items
///
/// Input may be the bare key or an object carrying the key under
/// `key_name`. Output is an object with the rendered key and the looked-up
/// value.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::fields::LookupField;
/// use reinhardt_marshal::{Field, Value};
///
/// let field = Field::new(LookupField::integer([(1, "Male"), (2, "Female")]));
///
/// assert_eq!(field.to_internal_value(Value::from("2")).unwrap(), Value::Int(2));
/// let rendered = field.to_representation(&Value::Int(1)).unwrap();
/// assert_eq!(rendered.get("value"), Some(&Value::from("Male")));
/// ```
#[derive(Debug, Clone)]
pub struct LookupField {
	key_field: Box<Field>,
	value_field: Box<Field>,
	items: Vec<(Value, Value)>,
	key_name: String,
	value_name: String,
}

impl LookupField {
	pub fn new<I, K, V>(key_field: Field, items: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<Value>,
		V: Into<Value>,
	{
		Self {
			key_field: Box::new(key_field),
			value_field: Box::new(Field::string()),
			items: items
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
			key_name: "key".to_string(),
			value_name: "value".to_string(),
		}
	}

	/// Lookup keyed by strings
	pub fn string<I, K, V>(items: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<Value>,
		V: Into<Value>,
	{
		Self::new(Field::new(StringField::default()), items)
	}

	/// Lookup keyed by integers
	pub fn integer<I, K, V>(items: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<Value>,
		V: Into<Value>,
	{
		Self::new(Field::new(IntegerField), items)
	}

	/// Lookup keyed by enumeration members
	pub fn enumeration<T, I, V>(items: I) -> Self
	where
		T: Choice,
		I: IntoIterator<Item = (T, V)>,
		V: Into<Value>,
	{
		Self::new(
			Field::new(EnumField::of::<T>()),
			items.into_iter().map(|(k, v)| (Value::from(k.member()), v)),
		)
	}

	pub fn with_key_name(mut self, name: impl Into<String>) -> Self {
		self.key_name = name.into();
		self
	}

	pub fn with_value_name(mut self, name: impl Into<String>) -> Self {
		self.value_name = name.into();
		self
	}

	fn lookup(&self, key: &Value) -> Option<&Value> {
		self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}
}

impl FieldType for LookupField {
	fn type_name(&self) -> &'static str {
		"lookup"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "Not a valid value.")]
	}

	fn bind(&mut self, parent: &Parent) {
		self.key_field.bind(parent, Some(&self.key_name));
		self.value_field.bind(parent, Some(&self.value_name));
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		let key = match data {
			Value::Map(entries) => match entries.get(&self.key_name) {
				None => return Err(field.fail("required")),
				Some(Value::Null) if self.lookup(&Value::Null).is_some() => Value::Null,
				Some(Value::Null) => return Err(field.fail("required")),
				Some(raw) => self.key_field.to_internal_value(raw.clone())?,
			},
			other => self.key_field.to_internal_value(other)?,
		};

		if self.lookup(&key).is_none() {
			return Err(field.fail("invalid"));
		}
		Ok(key)
	}

	fn to_representation(&self, _field: &Field, key: &Value) -> Result<Value, RepresentationError> {
		let value = self
			.lookup(key)
			.ok_or_else(|| RepresentationError::Other(format!("'{}' is not a lookup key", key)))?;

		let mut out = Map::new();
		let rendered_key = match key {
			Value::Null => Value::Null,
			key => self.key_field.to_representation(key)?,
		};
		out.insert(self.key_name.clone(), rendered_key);
		out.insert(self.value_name.clone(), self.value_field.to_representation(value)?);
		Ok(Value::Map(out))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::errors::{FieldError, ValidationError};
	use crate::fields::enum_field::tests::Status;
	use rstest::rstest;
	use serde_json::json;

	fn genders() -> Field {
		Field::new(LookupField::integer([(1, "Male"), (2, "Female")]))
	}

	#[rstest]
	#[case(Value::Int(1), 1)]
	#[case(Value::from("2"), 2)]
	#[case([("key", 2)].into_iter().collect::<Value>(), 2)]
	#[case([("key", "1")].into_iter().collect::<Value>(), 1)]
	fn test_to_internal_value(#[case] data: Value, #[case] expected: i64) {
		assert_eq!(genders().to_internal_value(data).unwrap(), Value::Int(expected));
	}

	#[rstest]
	fn test_unknown_key() {
		assert_eq!(
			genders().to_internal_value(Value::Int(3)),
			Err(FieldError::Invalid(ValidationError::message("Not a valid value.")))
		);
	}

	#[rstest]
	fn test_object_without_key() {
		let data: Value = [("value", "Male")].into_iter().collect();
		assert_eq!(
			genders().to_internal_value(data),
			Err(FieldError::Invalid(ValidationError::message("This field is required.")))
		);
	}

	#[rstest]
	fn test_null_key_allowed_only_when_listed() {
		// Arrange
		let with_null = Field::new(LookupField::new(
			Field::integer(),
			[(Value::Null, "Unknown"), (Value::Int(1), "Known")],
		));
		let data: Value = [("key", Value::Null)].into_iter().collect();

		// Act & Assert
		assert_eq!(with_null.to_internal_value(data.clone()).unwrap(), Value::Null);
		assert!(genders().to_internal_value(data).is_err());
	}

	#[rstest]
	fn test_key_field_error_propagates() {
		assert_eq!(
			genders().to_internal_value(Value::from("abc")),
			Err(FieldError::Invalid(ValidationError::message(
				"A valid integer is required."
			)))
		);
	}

	#[rstest]
	fn test_to_representation_with_custom_names() {
		// Arrange
		let field = Field::new(
			LookupField::string([("GB", "United Kingdom")])
				.with_key_name("code")
				.with_value_name("label"),
		);

		// Act
		let rendered = field.to_representation(&Value::from("GB")).unwrap();

		// Assert
		assert_eq!(
			rendered.to_json().unwrap(),
			json!({"code": "GB", "label": "United Kingdom"})
		);
	}

	#[rstest]
	fn test_enum_lookup() {
		// Arrange
		let field = Field::new(LookupField::enumeration([
			(Status::Active, "Active"),
			(Status::Inactive, "Inactive"),
		]));

		// Act
		let key = field.to_internal_value(Value::Int(2)).unwrap();
		let rendered = field.to_representation(&key).unwrap();

		// Assert
		assert_eq!(key, Value::from(Status::Inactive.member()));
		assert_eq!(rendered.to_json().unwrap(), json!({"key": 2, "value": "Inactive"}));
	}

	#[rstest]
	fn test_to_representation_unknown_key() {
		assert!(genders().to_representation(&Value::Int(9)).is_err());
	}
}
