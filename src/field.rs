//! Field contract
//!
//! A [`Field`] is one conversion unit: it resolves presence and defaults,
//! converts raw input into an internal value, runs its validator pipeline
//! and renders internal values back into a plain representation. The
//! type-specific part of that work is delegated to a [`FieldType`].
//!
//! Field declarations are templates. Composites clone them per instance and
//! bind the copies, so a declared template is never mutated after
//! construction and can be shared freely between threads.

use crate::context::{Context, Parent};
use crate::errors::{FieldError, FieldResult, RepresentationError, SerializerError, ValidationError};
use crate::validators::Validator;
use crate::value::{Map, Value};
use dyn_clone::DynClone;
use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

static CREATION_COUNTER: AtomicU64 = AtomicU64::new(0);

static EMPTY_CONTEXT: LazyLock<Context> = LazyLock::new(Context::new);

/// Messages every field type understands
const BASE_ERROR_MESSAGES: &[(&str, &str)] = &[
	("required", "This field is required."),
	("invalid", "Invalid value."),
];

fn next_creation_counter() -> u64 {
	CREATION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A fixed value or a zero-argument producer
#[derive(Clone)]
pub enum DefaultValue {
	Value(Value),
	Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
	pub fn resolve(&self) -> Value {
		match self {
			DefaultValue::Value(value) => value.clone(),
			DefaultValue::Factory(factory) => factory(),
		}
	}
}

impl fmt::Debug for DefaultValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
			DefaultValue::Factory(_) => f.write_str("Factory(..)"),
		}
	}
}

/// Direction(s) a field participates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
	#[default]
	ReadWrite,
	/// Rendered on output, never taken from input
	ReadOnly,
	/// Taken from input, never rendered on output
	WriteOnly,
}

/// Result of presence and null resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
	/// Terminal value resolved from a default; no conversion happens
	Resolved(Value),
	/// Real input that still needs conversion
	Present(Value),
}

/// Type-specific behaviour plugged into a [`Field`]
///
/// Every hook receives the owning field so implementations can raise typed
/// failures through [`Field::fail`] and read the bound context.
pub trait FieldType: DynClone + fmt::Debug + Send + Sync {
	/// Name used for `"<type>.<kind>"` message overrides
	fn type_name(&self) -> &'static str;

	/// Messages for the failure kinds this type raises
	fn error_messages(&self) -> &'static [(&'static str, &'static str)] {
		&[]
	}

	/// Bind nested fields; `parent` is the handle naming the owning field
	fn bind(&mut self, _parent: &Parent) {}

	/// Fallback used when neither `default` nor `default_empty` is set
	fn default_value(&self) -> Option<Value> {
		None
	}

	fn to_internal_value(&self, _field: &Field, data: Value) -> FieldResult<Value> {
		Ok(data)
	}

	fn to_representation(&self, _field: &Field, value: &Value) -> Result<Value, RepresentationError> {
		Ok(value.clone())
	}

	/// Post-conversion validation; runs the field's validator pipeline
	fn validate(&self, field: &Field, value: Value) -> FieldResult<Value> {
		field.run_validators(value)
	}

	/// Blank-form value when no `initial` is configured
	fn initial(&self, _field: &Field) -> Option<Value> {
		None
	}

	/// Bound child fields of a composite
	fn fields(&self) -> Option<&IndexMap<String, Field>> {
		None
	}

	/// Persist validated data as a new domain object
	fn create(&self, field: &Field, _data: Value) -> Result<Value, SerializerError> {
		Err(SerializerError::not_implemented(field.type_name(), "create"))
	}

	/// Apply validated data to an existing domain object
	fn update(&self, field: &Field, _instance: &Value, _data: Value) -> Result<Value, SerializerError> {
		Err(SerializerError::not_implemented(field.type_name(), "update"))
	}
}

dyn_clone::clone_trait_object!(FieldType);

/// A declared, optionally bound conversion unit
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{Field, Value};
///
/// let field = Field::integer().with_default(0);
///
/// assert_eq!(field.run_validation(Some(Value::from(" 42 "))).unwrap(), Value::Int(42));
/// assert_eq!(field.run_validation(None).unwrap(), Value::Int(0));
/// assert!(field.run_validation(Some(Value::from("4.2"))).is_err());
/// ```
#[derive(Clone)]
pub struct Field {
	creation_counter: u64,
	source: Option<String>,
	field_name: Option<String>,
	required: Option<bool>,
	access: Access,
	default: Option<DefaultValue>,
	default_empty: Option<DefaultValue>,
	initial: Option<DefaultValue>,
	validators: Vec<Arc<dyn Validator>>,
	error_messages: IndexMap<String, String>,
	parent: Option<Parent>,
	kind: Box<dyn FieldType>,
}

impl fmt::Debug for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Field")
			.field("creation_counter", &self.creation_counter)
			.field("field_name", &self.field_name)
			.field("source", &self.source)
			.field("required", &self.is_required())
			.field("access", &self.access)
			.field("default", &self.default)
			.field("default_empty", &self.default_empty)
			.field("validators", &self.validators.len())
			.field("kind", &self.kind)
			.finish()
	}
}

impl Field {
	pub fn new<T: FieldType + 'static>(kind: T) -> Self {
		Self {
			creation_counter: next_creation_counter(),
			source: None,
			field_name: None,
			required: None,
			access: Access::ReadWrite,
			default: None,
			default_empty: None,
			initial: None,
			validators: Vec::new(),
			error_messages: IndexMap::new(),
			parent: None,
			kind: Box::new(kind),
		}
	}

	/// Attribute or key read from domain objects, when it differs from the name
	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Explicit external name; normally assigned at bind time
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.field_name = Some(name.into());
		self
	}

	pub fn required(mut self) -> Self {
		self.required = Some(true);
		self
	}

	pub fn optional(mut self) -> Self {
		self.required = Some(false);
		self
	}

	/// Read-only fields are never required
	pub fn read_only(mut self) -> Self {
		self.access = Access::ReadOnly;
		self
	}

	pub fn write_only(mut self) -> Self {
		self.access = Access::WriteOnly;
		self
	}

	/// Substitute for explicit null (and for absence unless `default_empty` is set)
	pub fn with_default(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(DefaultValue::Value(value.into()));
		self
	}

	pub fn with_default_fn<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.default = Some(DefaultValue::Factory(Arc::new(factory)));
		self
	}

	/// Substitute for an absent value
	pub fn with_default_empty(mut self, value: impl Into<Value>) -> Self {
		self.default_empty = Some(DefaultValue::Value(value.into()));
		self
	}

	pub fn with_default_empty_fn<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.default_empty = Some(DefaultValue::Factory(Arc::new(factory)));
		self
	}

	pub fn with_initial(mut self, value: impl Into<Value>) -> Self {
		self.initial = Some(DefaultValue::Value(value.into()));
		self
	}

	pub fn with_initial_fn<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Value + Send + Sync + 'static,
	{
		self.initial = Some(DefaultValue::Factory(Arc::new(factory)));
		self
	}

	pub fn with_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	/// Override the message for one failure kind on this field only
	pub fn with_error_message(mut self, kind: impl Into<String>, message: impl Into<String>) -> Self {
		self.error_messages.insert(kind.into(), message.into());
		self
	}

	pub fn creation_counter(&self) -> u64 {
		self.creation_counter
	}

	pub fn field_name(&self) -> Option<&str> {
		self.field_name.as_deref()
	}

	/// Key used on domain objects and in validated data
	pub fn source(&self) -> Option<&str> {
		self.source.as_deref().or(self.field_name.as_deref())
	}

	pub fn access(&self) -> Access {
		self.access
	}

	pub fn is_read_only(&self) -> bool {
		self.access == Access::ReadOnly
	}

	pub fn is_write_only(&self) -> bool {
		self.access == Access::WriteOnly
	}

	/// Whether an explicit `default` or `default_empty` is configured
	pub fn has_default(&self) -> bool {
		self.default.is_some() || self.default_empty.is_some()
	}

	/// Required unless configured otherwise, defaulted, or read-only
	pub fn is_required(&self) -> bool {
		!self.is_read_only() && self.required.unwrap_or(!self.has_default())
	}

	pub fn kind(&self) -> &dyn FieldType {
		self.kind.as_ref()
	}

	pub fn type_name(&self) -> &'static str {
		self.kind.type_name()
	}

	/// Bound child fields, for composite field types
	pub fn fields(&self) -> Option<&IndexMap<String, Field>> {
		self.kind.fields()
	}

	pub fn parent(&self) -> Option<&Parent> {
		self.parent.as_ref()
	}

	/// Name of the outermost composite this field is bound under
	pub fn root(&self) -> Option<&str> {
		self.parent.as_ref().map(Parent::root_name)
	}

	/// Context of the root composite, or an empty context when unbound
	pub fn context(&self) -> &Context {
		self.parent
			.as_ref()
			.map(Parent::context)
			.unwrap_or(&EMPTY_CONTEXT)
	}

	/// Attach the field to its owner
	///
	/// Assigns `field_name` and `source` only when they are still unset; the
	/// parent handle is always replaced.
	pub fn bind(&mut self, parent: &Parent, field_name: Option<&str>) {
		if self.field_name.is_none() {
			self.field_name = field_name.map(str::to_string);
		}
		if self.source.is_none() {
			self.source = self.field_name.clone();
		}
		self.parent = Some(parent.clone());

		let own = self.field_name.clone().unwrap_or_else(|| parent.name().to_string());
		let handle = parent.child(own);
		self.kind.bind(&handle);
	}

	/// Raw external value for this field; `None` when the key is absent
	pub fn get_value(&self, data: &Map) -> Option<Value> {
		self.field_name.as_deref().and_then(|name| data.get(name)).cloned()
	}

	/// Read this field's source from a mapping or entity
	///
	/// Returns `Ok(None)` when the attribute is missing and the field is not
	/// required, meaning the field is skipped on output.
	pub fn get_attribute(&self, instance: &Value) -> Result<Option<Value>, RepresentationError> {
		let source = self.source().unwrap_or_default();
		let found = match instance {
			Value::Map(entries) => entries.get(source).cloned(),
			Value::Entity(entity) => entity.attribute(source),
			other => {
				return Err(RepresentationError::NotAnObject {
					attribute: source.to_string(),
					kind: other.kind(),
				});
			}
		};

		match found {
			Some(value) => Ok(Some(value)),
			None if !self.is_required() => {
				tracing::trace!(field = source, "attribute missing, skipping optional field");
				Ok(None)
			}
			None => Err(RepresentationError::MissingAttribute {
				attribute: source.to_string(),
				type_name: match instance {
					Value::Entity(entity) => entity.type_name().to_string(),
					other => other.kind().to_string(),
				},
			}),
		}
	}

	/// Default for an absent (`is_empty`) or null value
	pub fn get_default(&self, is_empty: bool) -> Value {
		let configured = if is_empty {
			self.default_empty.as_ref().or(self.default.as_ref())
		} else {
			self.default.as_ref()
		};

		match configured {
			Some(default) => default.resolve(),
			None => self.kind.default_value().unwrap_or_default(),
		}
	}

	/// Blank-form seed value
	pub fn get_initial(&self) -> Value {
		match &self.initial {
			Some(initial) => initial.resolve(),
			None => self.kind.initial(self).unwrap_or_default(),
		}
	}

	/// Resolve absence and null before any conversion
	pub fn validate_empty_values(&self, data: Option<Value>) -> FieldResult<Presence> {
		if self.is_read_only() {
			if !self.has_default() {
				return Err(FieldError::Skip);
			}
			return Ok(Presence::Resolved(self.get_default(true)));
		}

		match data {
			None if self.is_required() => Err(self.fail("required")),
			None => Ok(Presence::Resolved(self.get_default(true))),
			Some(Value::Null) => {
				let value = self.get_default(false);
				if value.is_null() && self.is_required() {
					return Err(self.fail("required"));
				}
				Ok(Presence::Resolved(value))
			}
			Some(value) => Ok(Presence::Present(value)),
		}
	}

	/// Full input pipeline: presence resolution, conversion, validation
	pub fn run_validation(&self, data: Option<Value>) -> FieldResult<Value> {
		match self.validate_empty_values(data)? {
			Presence::Resolved(value) => Ok(value),
			Presence::Present(value) => {
				let value = self.kind.to_internal_value(self, value)?;
				self.kind.validate(self, value)
			}
		}
	}

	/// Apply validators in order
	///
	/// A validator signalling [`FieldError::Skip`] ends the pipeline and the
	/// value produced by the preceding validators is accepted.
	pub fn run_validators(&self, value: Value) -> FieldResult<Value> {
		let mut value = value;
		for validator in &self.validators {
			match validator.validate(value.clone(), self) {
				Ok(next) => value = next,
				Err(FieldError::Skip) => {
					tracing::trace!(
						field = self.field_name().unwrap_or_default(),
						"validator pipeline skipped"
					);
					return Ok(value);
				}
				Err(err) => return Err(err),
			}
		}
		Ok(value)
	}

	pub fn to_internal_value(&self, data: Value) -> FieldResult<Value> {
		self.kind.to_internal_value(self, data)
	}

	pub fn to_representation(&self, value: &Value) -> Result<Value, RepresentationError> {
		self.kind.to_representation(self, value)
	}

	pub fn create(&self, data: Value) -> Result<Value, SerializerError> {
		self.kind.create(self, data)
	}

	pub fn update(&self, instance: &Value, data: Value) -> Result<Value, SerializerError> {
		self.kind.update(self, instance, data)
	}

	/// Render this field's attribute of `instance`
	///
	/// `Ok(None)` means the field is skipped; a null attribute renders as null.
	pub fn represent(&self, instance: &Value) -> Result<Option<Value>, RepresentationError> {
		match self.get_attribute(instance)? {
			None => Ok(None),
			Some(Value::Null) => Ok(Some(Value::Null)),
			Some(attribute) => self.to_representation(&attribute).map(Some),
		}
	}

	/// Resolved message for a failure kind
	pub fn error_message(&self, kind: &str) -> String {
		if let Some(message) = self.error_messages.get(kind) {
			return message.clone();
		}
		if let Some(message) = self.context().settings().error_message(self.type_name(), kind) {
			return message.to_string();
		}
		self.kind
			.error_messages()
			.iter()
			.chain(BASE_ERROR_MESSAGES)
			.find(|(k, _)| *k == kind)
			.map(|(_, message)| message.to_string())
			.unwrap_or_else(|| format!("Invalid value ({}).", kind))
	}

	/// Typed failure for `kind`
	pub fn fail(&self, kind: &str) -> FieldError {
		FieldError::Invalid(ValidationError::message(self.error_message(kind)))
	}
}
