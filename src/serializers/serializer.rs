use super::proxy::ProxyField;
use super::schema::Schema;
use crate::config::Settings;
use crate::context::{Context, Parent};
use crate::errors::{FieldError, SerializerError, ValidationError};
use crate::field::Field;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// One validation or rendering unit over a schema
///
/// A serializer is built for a single request: it owns a freshly bound copy
/// of the schema's fields, the raw input and/or the domain instance, and the
/// outcome of the last [`is_valid`](Self::is_valid) call.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{Field, Schema, Serializer, Value};
///
/// let schema = Schema::builder("Booking")
///     .field("guests", Field::integer())
///     .build();
///
/// let mut serializer = Serializer::new(&schema)
///     .with_data([("guests", "3")].into_iter().collect::<Value>());
///
/// assert!(serializer.is_valid());
/// assert_eq!(serializer.validated_data().unwrap().get("guests"), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone)]
pub struct Serializer {
	name: String,
	template: Field,
	field: Field,
	context: Context,
	data: Option<Value>,
	instance: Option<Value>,
	partial: bool,
	outcome: Option<Result<Value, ValidationError>>,
}

impl Serializer {
	pub fn new(schema: &Arc<Schema>) -> Self {
		Self::from_field(schema.name(), Field::nested(schema))
	}

	/// Serializer over a list of `schema` objects
	pub fn many(schema: &Arc<Schema>) -> Self {
		Self::from_field(schema.name(), Field::many(schema))
	}

	pub fn proxy(name: impl Into<String>, proxy: ProxyField) -> Self {
		Self::from_field(name, Field::new(proxy))
	}

	/// Serializer rooted at an arbitrary composite field
	pub fn from_field(name: impl Into<String>, template: Field) -> Self {
		let mut serializer = Self {
			name: name.into(),
			field: template.clone(),
			template,
			context: Context::new(),
			data: None,
			instance: None,
			partial: false,
			outcome: None,
		};
		serializer.bind();
		serializer
	}

	fn bind(&mut self) {
		let mut field = self.template.clone();
		field.bind(&Parent::root(self.name.as_str(), self.context.clone()), None);
		self.field = field;
	}

	/// Raw input to validate
	pub fn with_data(mut self, data: impl Into<Value>) -> Self {
		self.data = Some(data.into());
		self.outcome = None;
		self
	}

	/// Domain object to render, or to update on save
	pub fn with_instance(mut self, instance: impl Into<Value>) -> Self {
		self.instance = Some(instance.into());
		self
	}

	pub fn with_context(mut self, context: Context) -> Self {
		self.context = context;
		self.bind();
		self
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.context = self.context.clone().with_settings(settings);
		self.bind();
		self
	}

	/// Validate the payload layered over the bound instance
	pub fn partial(mut self) -> Self {
		self.partial = true;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn context(&self) -> &Context {
		&self.context
	}

	pub fn instance(&self) -> Option<&Value> {
		self.instance.as_ref()
	}

	/// Bound fields of the root schema
	pub fn fields(&self) -> Option<&IndexMap<String, Field>> {
		self.field.fields()
	}

	pub fn field(&self, name: &str) -> Option<&Field> {
		self.fields().and_then(|fields| fields.get(name))
	}

	/// Blank-form values for every field
	pub fn initial(&self) -> Value {
		self.field.get_initial()
	}

	/// Input actually validated: the payload (an empty mapping when none was
	/// given), or the partial layering
	fn effective_data(&self) -> Value {
		let data = self.data.clone().unwrap_or_else(Value::empty_map);
		if !self.partial {
			return data;
		}
		let Value::Map(payload) = data else {
			return data;
		};

		let mut layered = match self.initial() {
			Value::Map(initial) => initial,
			_ => Map::new(),
		};
		if let Some(instance) = &self.instance {
			match self.field.to_representation(instance) {
				Ok(Value::Map(current)) => layered.extend(current),
				Ok(_) => {}
				Err(error) => {
					tracing::warn!(
						serializer = %self.name,
						%error,
						"cannot render bound instance for partial update"
					);
				}
			}
		}
		layered.extend(payload);
		Value::Map(layered)
	}

	/// Run validation, storing either the validated data or the errors
	pub fn is_valid(&mut self) -> bool {
		let outcome = match self.field.run_validation(Some(self.effective_data())) {
			Ok(value) => Ok(value),
			Err(FieldError::Skip) => Ok(Value::empty_map()),
			Err(FieldError::Invalid(error)) => Err(error.into_mapping()),
		};
		let valid = outcome.is_ok();
		self.outcome = Some(outcome);
		valid
	}

	/// [`is_valid`](Self::is_valid), returning the error tree on failure
	pub fn is_valid_or_raise(&mut self) -> Result<(), SerializerError> {
		if self.is_valid() {
			return Ok(());
		}
		Err(SerializerError::Validation(
			self.errors().cloned().unwrap_or_else(|| ValidationError::Map(IndexMap::new())),
		))
	}

	/// Error tree of the last failed validation; always a mapping
	pub fn errors(&self) -> Option<&ValidationError> {
		match &self.outcome {
			Some(Err(errors)) => Some(errors),
			_ => None,
		}
	}

	/// Converted data of the last successful validation, keyed by source
	pub fn validated_data(&self) -> Option<&Value> {
		match &self.outcome {
			Some(Ok(value)) => Some(value),
			_ => None,
		}
	}

	/// Representation keyed by external field name
	///
	/// Renders the bound instance, else the validated data, else an empty
	/// mapping.
	pub fn data(&self) -> Result<Value, SerializerError> {
		if let Some(instance) = &self.instance {
			return Ok(self.field.to_representation(instance)?);
		}
		if let Some(validated) = self.validated_data() {
			return Ok(self.field.to_representation(validated)?);
		}
		Ok(Value::empty_map())
	}

	/// Persist the validated data merged with `overrides`
	///
	/// Dispatches to `update` when an instance is bound and to `create`
	/// otherwise; the result becomes the bound instance.
	pub fn save(&mut self, overrides: Map) -> Result<Value, SerializerError> {
		let validated = self
			.validated_data()
			.cloned()
			.ok_or(SerializerError::NotValidated)?;

		let merge = |value: Value| match value {
			Value::Map(mut map) => {
				map.extend(overrides.clone());
				Value::Map(map)
			}
			other => other,
		};
		let data = match validated {
			Value::List(items) => Value::List(items.into_iter().map(merge).collect()),
			other => merge(other),
		};

		let saved = match &self.instance {
			Some(instance) => {
				tracing::debug!(serializer = %self.name, "saving: update");
				self.field.update(instance, data)?
			}
			None => {
				tracing::debug!(serializer = %self.name, "saving: create");
				self.field.create(data)?
			}
		};
		self.instance = Some(saved.clone());
		Ok(saved)
	}
}
