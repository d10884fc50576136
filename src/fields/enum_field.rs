use crate::errors::{FieldResult, RepresentationError};
use crate::field::{Field, FieldType};
use crate::value::{EnumMember, Value};

/// A closed enumeration whose members carry an underlying value
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::fields::Choice;
/// use reinhardt_marshal::{Field, Value};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Colour {
///     Red,
///     Green,
/// }
///
/// impl Choice for Colour {
///     fn choices() -> &'static [Self] {
///         &[Colour::Red, Colour::Green]
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Colour::Red => "RED",
///             Colour::Green => "GREEN",
///         }
///     }
///
///     fn value(&self) -> Value {
///         match self {
///             Colour::Red => Value::from("red"),
///             Colour::Green => Value::from("green"),
///         }
///     }
/// }
///
/// let field = Field::enumeration::<Colour>();
/// let member = field.to_internal_value(Value::from("green")).unwrap();
/// assert_eq!(member, Value::from(Colour::Green.member()));
/// assert_eq!(field.to_representation(&member).unwrap(), Value::from("green"));
/// ```
pub trait Choice: Copy + Send + Sync + 'static {
	fn choices() -> &'static [Self];

	fn name(&self) -> &'static str;

	fn value(&self) -> Value;

	fn member(&self) -> EnumMember {
		EnumMember::new(std::any::type_name::<Self>(), self.name(), self.value())
	}

	/// Member carried by `value`, if it belongs to this enumeration
	fn from_member(member: &EnumMember) -> Option<Self> {
		if member.enumeration != std::any::type_name::<Self>() {
			return None;
		}
		Self::choices().iter().copied().find(|c| c.name() == member.name)
	}
}

/// Field converting underlying values into enumeration members
#[derive(Debug, Clone)]
pub struct EnumField {
	enumeration: &'static str,
	members: Vec<EnumMember>,
}

impl EnumField {
	pub fn of<T: Choice>() -> Self {
		Self {
			enumeration: std::any::type_name::<T>(),
			members: T::choices().iter().map(Choice::member).collect(),
		}
	}

	pub fn members(&self) -> &[EnumMember] {
		&self.members
	}
}

impl FieldType for EnumField {
	fn type_name(&self) -> &'static str {
		"enum"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("invalid", "Not a valid value.")]
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		if let Value::Enum(member) = &data
			&& member.enumeration == self.enumeration
		{
			return Ok(data);
		}

		self.members
			.iter()
			.find(|member| *member.value == data)
			.map(|member| Value::Enum(member.clone()))
			.ok_or_else(|| field.fail("invalid"))
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		match value {
			Value::Enum(member) => Ok((*member.value).clone()),
			other => Ok(other.clone()),
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Debug, Clone, Copy, PartialEq)]
	pub(crate) enum Status {
		Active,
		Inactive,
	}

	impl Choice for Status {
		fn choices() -> &'static [Self] {
			&[Status::Active, Status::Inactive]
		}

		fn name(&self) -> &'static str {
			match self {
				Status::Active => "ACTIVE",
				Status::Inactive => "INACTIVE",
			}
		}

		fn value(&self) -> Value {
			match self {
				Status::Active => Value::Int(1),
				Status::Inactive => Value::Int(2),
			}
		}
	}

	#[rstest]
	#[case(Value::Int(1), Status::Active)]
	#[case(Value::Int(2), Status::Inactive)]
	#[case(Value::from(Status::Inactive.member()), Status::Inactive)]
	fn test_to_internal_value(#[case] data: Value, #[case] expected: Status) {
		// Act
		let value = Field::enumeration::<Status>().to_internal_value(data).unwrap();

		// Assert
		let Value::Enum(member) = value else {
			panic!("expected an enum member");
		};
		assert_eq!(Status::from_member(&member), Some(expected));
	}

	#[rstest]
	#[case(Value::Int(3))]
	#[case(Value::from("ACTIVE"))]
	#[case(Value::Null)]
	fn test_to_internal_value_invalid(#[case] data: Value) {
		assert!(Field::enumeration::<Status>().to_internal_value(data).is_err());
	}

	#[rstest]
	#[case(Value::from(Status::Active.member()), Value::Int(1))]
	#[case(Value::Int(2), Value::Int(2))]
	fn test_to_representation(#[case] value: Value, #[case] expected: Value) {
		assert_eq!(
			Field::enumeration::<Status>().to_representation(&value).unwrap(),
			expected
		);
	}
}
