//! Leaf and container field types

// Scalar fields
pub mod boolean_field;
pub mod float_field;
pub mod integer_field;
pub mod json_field;
pub mod string_field;
pub mod uuid_field;

// Temporal fields
pub mod date_field;
pub mod datetime_field;

// Choice fields
pub mod enum_field;
pub mod lookup_field;

// Containers
pub mod comma_separated_field;
pub mod list_field;

pub use boolean_field::BooleanField;
pub use comma_separated_field::CommaSeparatedField;
pub use date_field::DateField;
pub use datetime_field::DateTimeField;
pub use enum_field::{Choice, EnumField};
pub use float_field::FloatField;
pub use integer_field::IntegerField;
pub use json_field::JsonField;
pub use list_field::ListField;
pub use lookup_field::LookupField;
pub use string_field::StringField;
pub use uuid_field::UuidField;

use crate::field::Field;

impl Field {
	/// Identity conversion in both directions
	pub fn json() -> Self {
		Field::new(JsonField)
	}

	/// Trimmed string
	pub fn string() -> Self {
		Field::new(StringField::default())
	}

	pub fn boolean() -> Self {
		Field::new(BooleanField)
	}

	pub fn integer() -> Self {
		Field::new(IntegerField)
	}

	pub fn float() -> Self {
		Field::new(FloatField)
	}

	pub fn date() -> Self {
		Field::new(DateField)
	}

	pub fn datetime() -> Self {
		Field::new(DateTimeField)
	}

	pub fn uuid() -> Self {
		Field::new(UuidField)
	}

	pub fn enumeration<T: Choice>() -> Self {
		Field::new(EnumField::of::<T>())
	}

	pub fn list(child: Field) -> Self {
		Field::new(ListField::new(child))
	}

	pub fn comma_separated(child: Field) -> Self {
		Field::new(CommaSeparatedField::new(child))
	}
}
