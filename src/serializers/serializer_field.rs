use super::schema::Schema;
use crate::context::{Context, Parent};
use crate::errors::{
	FieldError, FieldResult, PathSegment, RepresentationError, SerializerError, ValidationError,
};
use crate::field::{Field, FieldType};
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// Inputs accepted by the field on deserialization
pub(crate) fn is_writable(field: &Field) -> bool {
	!field.is_read_only() || field.has_default()
}

pub(crate) fn is_readable(field: &Field) -> bool {
	!field.is_write_only()
}

/// Fresh copies of `schema`'s templates bound under `parent`
fn bind_fields(schema: &Schema, parent: &Parent) -> IndexMap<String, Field> {
	schema
		.fields()
		.iter()
		.map(|(name, template)| {
			let mut field = template.clone();
			field.bind(parent, Some(name));
			(name.clone(), field)
		})
		.collect()
}

/// A schema used as a field: a nested object
///
/// Deserialization takes a mapping keyed by field name and produces one keyed
/// by field source; serialization reads each readable field's source from a
/// mapping or entity.
#[derive(Debug, Clone)]
pub struct SerializerField {
	schema: Arc<Schema>,
	fields: IndexMap<String, Field>,
}

impl SerializerField {
	pub fn new(schema: Arc<Schema>) -> Self {
		let fields = bind_fields(&schema, &Parent::root(schema.name(), Context::new()));
		Self { schema, fields }
	}

	pub fn schema(&self) -> &Arc<Schema> {
		&self.schema
	}

	fn writable(&self) -> impl Iterator<Item = (&String, &Field)> {
		self.fields.iter().filter(|(_, field)| is_writable(field))
	}

	fn readable(&self) -> impl Iterator<Item = (&String, &Field)> {
		self.fields.iter().filter(|(_, field)| is_readable(field))
	}

	fn data_map(&self, field: &Field, data: Value) -> Result<Map, SerializerError> {
		match data {
			Value::Map(map) => Ok(map),
			other => Err(SerializerError::Save(format!(
				"{} expects an object, got {}",
				field.type_name(),
				other.kind()
			))),
		}
	}
}

impl FieldType for SerializerField {
	fn type_name(&self) -> &'static str {
		"serializer"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[("not_a_dict", "Expected an object.")]
	}

	fn bind(&mut self, parent: &Parent) {
		self.fields = bind_fields(&self.schema, parent);
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		let Value::Map(data) = data else {
			return Err(field.fail("not_a_dict"));
		};
		let hooks = self.schema.hooks();

		let mut raw: Map = self
			.writable()
			.filter_map(|(name, child)| child.get_value(&data).map(|value| (name.clone(), value)))
			.collect();
		if let Some(pre_validate) = &hooks.pre_validate {
			raw = pre_validate(raw)?;
		}

		let mut output = Map::new();
		let mut errors = IndexMap::new();
		for (name, child) in self.writable() {
			let result = child.run_validation(raw.shift_remove(name)).and_then(|value| {
				match hooks.field_hook(name) {
					Some(hook) => hook(value, child),
					None => Ok(value),
				}
			});

			match result {
				Ok(value) => {
					let key = child.source().unwrap_or(name);
					output.insert(key.to_string(), value);
				}
				Err(FieldError::Skip) => {
					tracing::trace!(schema = self.schema.name(), field = %name, "field skipped");
				}
				Err(FieldError::Invalid(error)) => {
					errors.insert(PathSegment::Key(name.clone()), error);
				}
			}
		}

		if !errors.is_empty() {
			return Err(FieldError::Invalid(ValidationError::Map(errors)));
		}
		Ok(Value::Map(output))
	}

	fn validate(&self, field: &Field, value: Value) -> FieldResult<Value> {
		let hooks = self.schema.hooks();

		let run = || -> FieldResult<Value> {
			let mut value = field.run_validators(value)?;
			for validator in &hooks.validators {
				match validator.validate(value.clone(), field) {
					Ok(next) => value = next,
					Err(FieldError::Skip) => return Ok(value),
					Err(err) => return Err(err),
				}
			}
			match (&hooks.validate, value) {
				(Some(validate), Value::Map(map)) => validate(map, field).map(Value::Map),
				(_, value) => Ok(value),
			}
		};

		run().map_err(|err| match err {
			FieldError::Invalid(error) => FieldError::Invalid(error.into_mapping()),
			skip => skip,
		})
	}

	fn to_representation(&self, _field: &Field, instance: &Value) -> Result<Value, RepresentationError> {
		let mut output = Map::new();
		for (name, child) in self.readable() {
			if let Some(value) = child.represent(instance).map_err(|err| err.in_field(name.as_str()))? {
				output.insert(name.clone(), value);
			}
		}
		Ok(Value::Map(output))
	}

	fn initial(&self, _field: &Field) -> Option<Value> {
		Some(Value::Map(
			self.fields
				.iter()
				.map(|(name, child)| (name.clone(), child.get_initial()))
				.collect(),
		))
	}

	fn fields(&self) -> Option<&IndexMap<String, Field>> {
		Some(&self.fields)
	}

	fn create(&self, field: &Field, data: Value) -> Result<Value, SerializerError> {
		let data = self.data_map(field, data)?;
		match &self.schema.hooks().create {
			Some(create) => create(data, field),
			None => Err(SerializerError::not_implemented(self.schema.name(), "create")),
		}
	}

	fn update(&self, field: &Field, instance: &Value, data: Value) -> Result<Value, SerializerError> {
		let data = self.data_map(field, data)?;
		match &self.schema.hooks().update {
			Some(update) => update(instance, data, field),
			None => Err(SerializerError::not_implemented(self.schema.name(), "update")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn bound(schema: &Arc<Schema>) -> Field {
		let mut field = Field::nested(schema);
		field.bind(&Parent::root(schema.name(), Context::new()), None);
		field
	}

	fn object(value: serde_json::Value) -> Value {
		Value::from(value)
	}

	fn errors(result: FieldResult<Value>) -> serde_json::Value {
		match result {
			Err(FieldError::Invalid(error)) => error.to_json(),
			other => panic!("expected a validation failure, got {other:?}"),
		}
	}

	#[rstest]
	fn test_output_is_keyed_by_source() {
		// Arrange
		let schema = Schema::builder("S")
			.field("firstName", Field::string().with_source("first_name"))
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({"firstName": "Ada"}))));

		// Assert
		assert_eq!(result.unwrap().to_json().unwrap(), json!({"first_name": "Ada"}));
	}

	#[rstest]
	fn test_not_a_dict() {
		let schema = Schema::builder("S").field("a", Field::integer()).build();
		assert_eq!(
			errors(bound(&schema).run_validation(Some(Value::Int(1)))),
			json!(["Expected an object."])
		);
	}

	#[rstest]
	fn test_siblings_are_all_validated() {
		// Arrange
		let schema = Schema::builder("S")
			.field("a", Field::integer())
			.field("b", Field::integer())
			.field("c", Field::integer())
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({"a": "x", "c": 3}))));

		// Assert
		assert_eq!(
			errors(result),
			json!({
				"a": ["A valid integer is required."],
				"b": ["This field is required."],
			})
		);
	}

	#[rstest]
	fn test_read_only_fields_are_ignored_unless_defaulted() {
		// Arrange
		let schema = Schema::builder("S")
			.field("id", Field::integer().read_only())
			.field("kind", Field::string().read_only().with_default("person"))
			.field("name", Field::string())
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({
			"id": 7,
			"kind": "robot",
			"name": "Ada",
		}))));

		// Assert
		assert_eq!(
			result.unwrap().to_json().unwrap(),
			json!({"kind": "person", "name": "Ada"})
		);
	}

	#[rstest]
	fn test_skipped_fields_are_omitted() {
		// Arrange
		let schema = Schema::builder("S")
			.field("a", Field::integer())
			.validate_field("a", |_: Value, _: &Field| -> FieldResult<Value> { Err(FieldError::Skip) })
			.field("b", Field::integer())
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({"a": 1, "b": 2}))));

		// Assert
		assert_eq!(result.unwrap().to_json().unwrap(), json!({"b": 2}));
	}

	#[rstest]
	fn test_field_hook_runs_after_field_validation() {
		// Arrange
		let schema = Schema::builder("S")
			.field("n", Field::integer())
			.validate_field("n", |value: Value, _: &Field| -> FieldResult<Value> {
				match value {
					Value::Int(n) if n % 2 == 0 => Ok(Value::Int(n / 2)),
					_ => Err(ValidationError::message("Must be even.").into()),
				}
			})
			.build();
		let field = bound(&schema);

		// Act & Assert
		assert_eq!(
			field.run_validation(Some(object(json!({"n": "8"})))).unwrap().to_json().unwrap(),
			json!({"n": 4})
		);
		assert_eq!(
			errors(field.run_validation(Some(object(json!({"n": 3}))))),
			json!({"n": ["Must be even."]})
		);
	}

	#[rstest]
	fn test_pre_validate_sees_raw_values() {
		// Arrange
		let schema = Schema::builder("S")
			.field("low", Field::integer())
			.field("high", Field::integer())
			.pre_validate(|mut raw: Map| {
				if let (Some(low), Some(high)) = (raw.get("low").cloned(), raw.get("high").cloned())
					&& low > high
				{
					raw.insert("low".to_string(), high);
					raw.insert("high".to_string(), low);
				}
				Ok(raw)
			})
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({"low": 9, "high": 2}))));

		// Assert
		assert_eq!(result.unwrap().to_json().unwrap(), json!({"low": 2, "high": 9}));
	}

	#[rstest]
	fn test_object_level_failure_is_wrapped() {
		// Arrange
		let schema = Schema::builder("S")
			.field("start", Field::integer())
			.field("end", Field::integer())
			.validate(|data: Map, _: &Field| -> FieldResult<Map> {
				if data.get("start") > data.get("end") {
					return Err(ValidationError::message("start must precede end").into());
				}
				Ok(data)
			})
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({"start": 5, "end": 1}))));

		// Assert
		assert_eq!(errors(result), json!({"_": ["start must precede end"]}));
	}

	#[rstest]
	fn test_object_level_mapping_failure_is_kept() {
		// Arrange
		let schema = Schema::builder("S")
			.field("a", Field::integer())
			.validator(|_: Value| -> FieldResult<Value> {
				Err(ValidationError::map([("a", ValidationError::message("Taken."))]).into())
			})
			.build();

		// Act
		let result = bound(&schema).run_validation(Some(object(json!({"a": 1}))));

		// Assert
		assert_eq!(errors(result), json!({"a": ["Taken."]}));
	}

	#[rstest]
	fn test_to_representation_skips_write_only_and_missing_optional() {
		// Arrange
		let schema = Schema::builder("S")
			.field("name", Field::string())
			.field("password", Field::string().write_only())
			.field("nickname", Field::string().optional())
			.field("age", Field::integer().optional())
			.build();
		let instance = object(json!({"name": "Ada", "password": "secret", "age": null}));

		// Act
		let rendered = bound(&schema).to_representation(&instance).unwrap();

		// Assert
		assert_eq!(rendered.to_json().unwrap(), json!({"name": "Ada", "age": null}));
	}

	#[rstest]
	fn test_to_representation_missing_required_attribute() {
		let schema = Schema::builder("S").field("name", Field::string()).build();
		let result = bound(&schema).to_representation(&Value::empty_map());
		assert!(matches!(result, Err(RepresentationError::Field { .. })));
	}

	#[rstest]
	fn test_nested_errors_and_representation() {
		// Arrange
		let address = Schema::builder("Address")
			.field("postcode", Field::string())
			.field("since", Field::date())
			.build();
		let person = Schema::builder("Person")
			.field("name", Field::string())
			.field("address", Field::nested(&address))
			.build();
		let field = bound(&person);

		// Act
		let result = field.run_validation(Some(object(json!({
			"name": "Ada",
			"address": {"postcode": "N1 9GU", "since": "never"},
		}))));

		// Assert
		assert_eq!(
			errors(result),
			json!({"address": {"since": ["Invalid date format."]}})
		);
	}

	#[rstest]
	fn test_nested_fields_share_the_root_context() {
		// Arrange
		let inner = Schema::builder("Inner").field("a", Field::json()).build();
		let outer = Schema::builder("Outer").field("inner", Field::nested(&inner)).build();
		let mut field = Field::nested(&outer);

		// Act
		field.bind(&Parent::root("Outer", Context::new().with("user", "ada")), None);

		// Assert
		let inner_fields = field.fields().unwrap()["inner"].fields().unwrap();
		assert_eq!(inner_fields["a"].context().get("user"), Some(&Value::from("ada")));
		assert_eq!(inner_fields["a"].root(), Some("Outer"));
	}

	#[rstest]
	fn test_initial() {
		// Arrange
		let schema = Schema::builder("S")
			.field("name", Field::string().with_initial("anonymous"))
			.field("tags", Field::list(Field::string()))
			.field("age", Field::integer())
			.build();

		// Act
		let initial = bound(&schema).get_initial();

		// Assert
		assert_eq!(
			initial.to_json().unwrap(),
			json!({"name": "anonymous", "tags": [], "age": null})
		);
	}

	#[rstest]
	fn test_create_without_hook_is_not_implemented() {
		let schema = Schema::builder("Thing").field("a", Field::json()).build();
		let result = bound(&schema).create(Value::empty_map());
		assert!(matches!(
			result,
			Err(SerializerError::NotImplemented { ref schema, operation: "create" }) if schema == "Thing"
		));
	}
}
