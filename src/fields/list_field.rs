use crate::context::Parent;
use crate::errors::{FieldError, FieldResult, PathSegment, RepresentationError, ValidationError};
use crate::field::{Field, FieldType};
use crate::value::Value;
use indexmap::IndexMap;

/// Run `child`'s full validation over every item
///
/// Failures are collected per index; an item whose pipeline signals skip is
/// dropped from the output.
pub(crate) fn validate_items<I>(child: &Field, items: I) -> FieldResult<Value>
where
	I: IntoIterator<Item = Value>,
{
	let mut values = Vec::new();
	let mut errors = IndexMap::new();

	for (index, item) in items.into_iter().enumerate() {
		match child.run_validation(Some(item)) {
			Ok(value) => values.push(value),
			Err(FieldError::Skip) => {
				tracing::trace!(index, "list item skipped");
			}
			Err(FieldError::Invalid(error)) => {
				errors.insert(PathSegment::Index(index), error);
			}
		}
	}

	if !errors.is_empty() {
		return Err(FieldError::Invalid(ValidationError::Map(errors)));
	}
	Ok(Value::List(values))
}

/// Render every item through `child`; null items stay null
pub(crate) fn represent_items(child: &Field, items: &[Value]) -> Result<Vec<Value>, RepresentationError> {
	items
		.iter()
		.enumerate()
		.map(|(index, item)| match item {
			Value::Null => Ok(Value::Null),
			item => child
				.to_representation(item)
				.map_err(|err| err.in_field(index.to_string())),
		})
		.collect()
}

/// Homogeneous list of a child field
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{Field, Value};
///
/// let field = Field::list(Field::integer());
///
/// let value = field.run_validation(Some(Value::from(vec![Value::from("1"), Value::Int(2)])));
/// assert_eq!(value.unwrap(), Value::from(vec![Value::Int(1), Value::Int(2)]));
/// ```
#[derive(Debug, Clone)]
pub struct ListField {
	child: Box<Field>,
}

impl ListField {
	pub fn new(child: Field) -> Self {
		Self {
			child: Box::new(child),
		}
	}

	pub fn child(&self) -> &Field {
		&self.child
	}
}

impl FieldType for ListField {
	fn type_name(&self) -> &'static str {
		"list"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("not_a_list", "Expected a list.")]
	}

	fn bind(&mut self, parent: &Parent) {
		self.child.bind(parent, None);
	}

	fn default_value(&self) -> Option<Value> {
		Some(Value::List(Vec::new()))
	}

	fn initial(&self, _field: &Field) -> Option<Value> {
		Some(Value::List(Vec::new()))
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		match data {
			Value::List(items) => validate_items(&self.child, items),
			_ => Err(field.fail("not_a_list")),
		}
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::List(items) => represent_items(&self.child, items).map(Value::List),
			other => Err(RepresentationError::unrepresentable("a list", other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	fn list(items: &[Value]) -> Value {
		Value::List(items.to_vec())
	}

	#[rstest]
	fn test_to_internal_value() {
		// Arrange
		let field = Field::list(Field::date());

		// Act
		let result = field.run_validation(Some(list(&[
			Value::from("2001-02-03"),
			Value::from("2016-01-01"),
		])));

		// Assert
		assert_eq!(
			result.unwrap(),
			list(&[
				Value::from(NaiveDate::from_ymd_opt(2001, 2, 3).unwrap()),
				Value::from(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()),
			])
		);
	}

	#[rstest]
	#[case(Value::from("foo"))]
	#[case(Value::Int(1))]
	#[case(Value::empty_map())]
	fn test_not_a_list(#[case] data: Value) {
		assert_eq!(
			Field::list(Field::integer()).run_validation(Some(data)),
			Err(FieldError::Invalid(ValidationError::message("Expected a list.")))
		);
	}

	#[rstest]
	fn test_errors_are_keyed_by_index() {
		// Act
		let result = Field::list(Field::integer())
			.run_validation(Some(list(&[Value::Int(1), Value::from("x"), Value::Int(3)])));

		// Assert
		let Err(FieldError::Invalid(error)) = result else {
			panic!("expected a validation failure");
		};
		assert_eq!(error.to_json(), json!({"1": ["A valid integer is required."]}));
		assert_eq!(
			error.first(),
			Some((vec![PathSegment::Index(1)], "A valid integer is required.".to_string()))
		);
	}

	#[rstest]
	fn test_null_items_follow_child_nullability() {
		// Arrange
		let data = list(&[Value::Int(1), Value::Null]);

		// Act
		let optional = Field::list(Field::integer().optional()).run_validation(Some(data.clone()));
		let required = Field::list(Field::integer()).run_validation(Some(data));

		// Assert
		assert_eq!(optional.unwrap(), list(&[Value::Int(1), Value::Null]));
		let Err(FieldError::Invalid(error)) = required else {
			panic!("expected a validation failure");
		};
		assert_eq!(error.to_json(), json!({"1": ["This field is required."]}));
	}

	#[rstest]
	fn test_default_is_empty_list() {
		let field = Field::list(Field::integer()).optional();
		assert_eq!(field.run_validation(None).unwrap(), list(&[]));
		assert_eq!(field.get_initial(), list(&[]));
	}

	#[rstest]
	fn test_to_representation() {
		// Arrange
		let field = Field::list(Field::date());
		let value = list(&[
			Value::from(NaiveDate::from_ymd_opt(2001, 2, 3).unwrap()),
			Value::Null,
		]);

		// Act
		let rendered = field.to_representation(&value).unwrap();

		// Assert
		assert_eq!(rendered, list(&[Value::from("2001-02-03"), Value::Null]));
	}

	proptest! {
		#[test]
		fn prop_single_bad_item_reports_only_its_index(len in 1usize..12, bad in 0usize..12) {
			// Arrange
			let bad = bad % len;
			let items: Vec<Value> = (0..len)
				.map(|i| if i == bad { Value::from("nope") } else { Value::Int(i as i64) })
				.collect();

			// Act
			let result = Field::list(Field::integer()).run_validation(Some(Value::List(items)));

			// Assert
			let Err(FieldError::Invalid(ValidationError::Map(errors))) = result else {
				panic!("expected a mapping of errors");
			};
			prop_assert_eq!(errors.len(), 1);
			prop_assert!(errors.contains_key(&PathSegment::Index(bad)));
		}
	}
}
