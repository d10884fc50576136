use super::schema::Schema;
use crate::context::Parent;
use crate::errors::{FieldResult, RepresentationError, SerializerError};
use crate::field::{Field, FieldType};
use crate::value::{Entity, Map, Value};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

type InputSelector = Arc<dyn Fn(&Map) -> Option<Arc<Schema>> + Send + Sync>;
type InstanceSelector = Arc<dyn Fn(&Value) -> Option<Arc<Schema>> + Send + Sync>;

/// One field standing for a closed set of schemas
///
/// Every operation picks the concrete schema per call, from the input
/// mapping on deserialization and from the domain instance on serialization,
/// then delegates to a freshly bound nested field of that schema.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::serializers::ProxyField;
/// use reinhardt_marshal::{Field, Schema, Value};
///
/// let cat = Schema::builder("Cat")
///     .field("type", Field::string())
///     .field("lives", Field::integer())
///     .build();
/// let dog = Schema::builder("Dog")
///     .field("type", Field::string())
///     .field("good", Field::boolean())
///     .build();
/// let pet = Field::new(ProxyField::by_key("type", [("cat", cat), ("dog", dog)]));
///
/// let data: Value = [("type", Value::from("dog")), ("good", Value::from("yes"))]
///     .into_iter()
///     .collect();
/// let value = pet.run_validation(Some(data)).unwrap();
/// assert_eq!(value.get("good"), Some(&Value::Bool(true)));
/// ```
#[derive(Clone)]
pub struct ProxyField {
	select_input: InputSelector,
	select_instance: InstanceSelector,
	entity_types: Vec<(TypeId, Arc<Schema>)>,
	parent: Option<Parent>,
}

impl ProxyField {
	pub fn new<I, S>(select_input: I, select_instance: S) -> Self
	where
		I: Fn(&Map) -> Option<Arc<Schema>> + Send + Sync + 'static,
		S: Fn(&Value) -> Option<Arc<Schema>> + Send + Sync + 'static,
	{
		Self {
			select_input: Arc::new(select_input),
			select_instance: Arc::new(select_instance),
			entity_types: Vec::new(),
			parent: None,
		}
	}

	/// Select by the value stored under `key`, both in input and on instances
	pub fn by_key<I, V>(key: impl Into<String>, variants: I) -> Self
	where
		I: IntoIterator<Item = (V, Arc<Schema>)>,
		V: Into<Value>,
	{
		let key: Arc<str> = Arc::from(key.into());
		let variants: Arc<Vec<(Value, Arc<Schema>)>> =
			Arc::new(variants.into_iter().map(|(v, s)| (v.into(), s)).collect());

		let find = {
			let variants = Arc::clone(&variants);
			move |discriminator: Option<Value>| -> Option<Arc<Schema>> {
				let discriminator = discriminator?;
				variants
					.iter()
					.find(|(value, _)| *value == discriminator)
					.map(|(_, schema)| Arc::clone(schema))
			}
		};
		let find_input = find.clone();
		let input_key = Arc::clone(&key);

		Self::new(
			move |data: &Map| find_input(data.get(input_key.as_ref()).cloned()),
			move |instance: &Value| {
				let discriminator = match instance {
					Value::Map(map) => map.get(key.as_ref()).cloned(),
					Value::Entity(entity) => entity.attribute(&key),
					_ => None,
				};
				find(discriminator)
			},
		)
	}

	/// Render entities of type `T` with `schema`, checked before the selector
	pub fn entity<T: Entity>(mut self, schema: Arc<Schema>) -> Self {
		self.entity_types.push((TypeId::of::<T>(), schema));
		self
	}

	fn for_instance(&self, instance: &Value) -> Option<Arc<Schema>> {
		if let Value::Entity(entity) = instance {
			let type_id = entity.as_any().type_id();
			if let Some((_, schema)) = self.entity_types.iter().find(|(id, _)| *id == type_id) {
				return Some(Arc::clone(schema));
			}
		}
		(self.select_instance)(instance)
	}

	/// A nested field of `schema` bound where this proxy is bound
	fn delegate(&self, field: &Field, schema: &Arc<Schema>) -> Field {
		let mut delegate = Field::nested(schema);
		if let Some(parent) = &self.parent {
			delegate.bind(parent, field.field_name());
		}
		delegate
	}
}

impl fmt::Debug for ProxyField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProxyField")
			.field("entity_types", &self.entity_types.len())
			.field("parent", &self.parent)
			.finish_non_exhaustive()
	}
}

impl FieldType for ProxyField {
	fn type_name(&self) -> &'static str {
		"proxy"
	}

	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[
			("not_a_dict", "Expected an object."),
			("unknown", "Could not determine the object type."),
		]
	}

	fn bind(&mut self, parent: &Parent) {
		self.parent = Some(parent.clone());
	}

	fn to_internal_value(&self, field: &Field, data: Value) -> FieldResult<Value> {
		let Value::Map(map) = &data else {
			return Err(field.fail("not_a_dict"));
		};
		let schema = (self.select_input)(map).ok_or_else(|| field.fail("unknown"))?;

		// Full run of the chosen schema, object-level hooks included
		self.delegate(field, &schema).run_validation(Some(data))
	}

	fn to_representation(&self, field: &Field, instance: &Value) -> Result<Value, RepresentationError> {
		let schema = self.for_instance(instance).ok_or_else(|| {
			RepresentationError::Other(format!("no schema matches this {} value", instance.kind()))
		})?;
		self.delegate(field, &schema).to_representation(instance)
	}

	fn create(&self, field: &Field, data: Value) -> Result<Value, SerializerError> {
		let schema = data
			.as_map()
			.and_then(|map| (self.select_input)(map))
			.ok_or_else(|| SerializerError::Save("no schema matches the validated data".to_string()))?;
		self.delegate(field, &schema).create(data)
	}

	fn update(&self, field: &Field, instance: &Value, data: Value) -> Result<Value, SerializerError> {
		let schema = self
			.for_instance(instance)
			.ok_or_else(|| SerializerError::Save("no schema matches the bound instance".to_string()))?;
		self.delegate(field, &schema).update(instance, data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::Context;
	use crate::errors::{FieldError, ValidationError};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::any::Any;

	#[derive(Debug)]
	struct Circle {
		radius: i64,
	}

	impl Entity for Circle {
		fn attribute(&self, name: &str) -> Option<Value> {
			match name {
				"radius" => Some(Value::Int(self.radius)),
				_ => None,
			}
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	#[fixture]
	fn shapes() -> Field {
		let circle = Schema::builder("Circle")
			.field("kind", Field::string().read_only().with_default("circle"))
			.field("radius", Field::integer())
			.build();
		let square = Schema::builder("Square")
			.field("kind", Field::string().read_only().with_default("square"))
			.field("side", Field::integer())
			.build();
		let proxy =
			ProxyField::by_key("kind", [("circle", Arc::clone(&circle)), ("square", square)])
				.entity::<Circle>(circle);

		let mut field = Field::new(proxy);
		field.bind(&Parent::root("Shape", Context::new()), None);
		field
	}

	#[rstest]
	fn test_dispatches_on_input(shapes: Field) {
		// Act
		let result = shapes.run_validation(Some(Value::from(json!({"kind": "square", "side": "3"}))));

		// Assert
		assert_eq!(
			result.unwrap().to_json().unwrap(),
			json!({"kind": "square", "side": 3})
		);
	}

	#[rstest]
	fn test_reports_errors_of_the_chosen_schema(shapes: Field) {
		// Act
		let result = shapes.run_validation(Some(Value::from(json!({"kind": "circle"}))));

		// Assert
		let Err(FieldError::Invalid(error)) = result else {
			panic!("expected a validation failure");
		};
		assert_eq!(error.to_json(), json!({"radius": ["This field is required."]}));
	}

	#[rstest]
	#[case(json!({"kind": "hexagon"}))]
	#[case(json!({"side": 1}))]
	fn test_unknown_shape(shapes: Field, #[case] data: serde_json::Value) {
		assert_eq!(
			shapes.run_validation(Some(Value::from(data))),
			Err(FieldError::Invalid(ValidationError::message(
				"Could not determine the object type."
			)))
		);
	}

	#[rstest]
	fn test_renders_maps_by_key_and_entities_by_type(shapes: Field) {
		// Arrange
		let square = Value::from(json!({"kind": "square", "side": 2}));
		let circle = Value::entity(Circle { radius: 5 });

		// Act
		let square = shapes.to_representation(&square).unwrap();
		let circle = shapes.to_representation(&circle).unwrap();

		// Assert
		assert_eq!(square.to_json().unwrap(), json!({"kind": "square", "side": 2}));
		assert_eq!(circle.to_json().unwrap(), json!({"radius": 5}));
	}

	#[rstest]
	fn test_list_of_proxies(shapes: Field) {
		// Arrange
		let mut list = Field::new(crate::serializers::ListSerializerField::of(shapes));
		list.bind(&Parent::root("Shapes", Context::new()), None);

		// Act
		let result = list.run_validation(Some(Value::from(json!([
			{"kind": "circle", "radius": 1},
			{"kind": "square", "side": "x"},
		]))));

		// Assert
		let Err(FieldError::Invalid(error)) = result else {
			panic!("expected a validation failure");
		};
		assert_eq!(
			error.to_json(),
			json!({"1": {"side": ["A valid integer is required."]}})
		);
	}
}
