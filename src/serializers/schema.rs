//! Schema assembly
//!
//! A [`Schema`] is the immutable, assembled field template of one serializer
//! type. It is built once through [`SchemaBuilder`] from its bases (other
//! schemas or plain [`Mixin`]s) and its own declarations, then shared behind
//! an `Arc` by every serializer instance created from it.
//!
//! Fields are merged layer by layer: for `merge(base, over)` the names only
//! present in `base` keep their relative order and come first, followed by
//! every entry of `over` in its own order. Bases are merged from the last
//! listed to the first, and the schema's own declarations are merged last, so
//! the most-derived declaration of a name wins and is ordered last.

use crate::errors::{FieldResult, SerializerError, ValidationError};
use crate::field::Field;
use crate::validators::Validator;
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Per-field hook run after the field's own validation
pub type FieldHook = Arc<dyn Fn(Value, &Field) -> FieldResult<Value> + Send + Sync>;

/// Batch hook over the raw extracted input values, keyed by field name
pub type PreValidateHook = Arc<dyn Fn(Map) -> Result<Map, ValidationError> + Send + Sync>;

/// Object-level hook run after every field converted successfully
pub type ValidateHook = Arc<dyn Fn(Map, &Field) -> FieldResult<Map> + Send + Sync>;

pub type CreateHook = Arc<dyn Fn(Map, &Field) -> Result<Value, SerializerError> + Send + Sync>;

pub type UpdateHook = Arc<dyn Fn(&Value, Map, &Field) -> Result<Value, SerializerError> + Send + Sync>;

/// Behaviour attached to a schema besides its fields
#[derive(Clone, Default)]
pub struct Hooks {
	pub(crate) field_hooks: IndexMap<String, FieldHook>,
	pub(crate) pre_validate: Option<PreValidateHook>,
	pub(crate) validators: Vec<Arc<dyn Validator>>,
	pub(crate) validate: Option<ValidateHook>,
	pub(crate) create: Option<CreateHook>,
	pub(crate) update: Option<UpdateHook>,
}

impl Hooks {
	/// Lay `over` on top of `self`; every hook set in `over` wins
	fn overlay(&mut self, over: &Hooks) {
		for (name, hook) in &over.field_hooks {
			self.field_hooks.insert(name.clone(), Arc::clone(hook));
		}
		if over.pre_validate.is_some() {
			self.pre_validate = over.pre_validate.clone();
		}
		if !over.validators.is_empty() {
			self.validators = over.validators.clone();
		}
		if over.validate.is_some() {
			self.validate = over.validate.clone();
		}
		if over.create.is_some() {
			self.create = over.create.clone();
		}
		if over.update.is_some() {
			self.update = over.update.clone();
		}
	}

	pub fn field_hook(&self, name: &str) -> Option<&FieldHook> {
		self.field_hooks.get(name)
	}
}

impl fmt::Debug for Hooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Hooks")
			.field("field_hooks", &self.field_hooks.keys().collect::<Vec<_>>())
			.field("pre_validate", &self.pre_validate.is_some())
			.field("validators", &self.validators.len())
			.field("validate", &self.validate.is_some())
			.field("create", &self.create.is_some())
			.field("update", &self.update.is_some())
			.finish()
	}
}

/// Merge two field layers
///
/// Names unique to `base` keep their order and precede every entry of
/// `over`, which keeps its own order.
pub fn merge(base: IndexMap<String, Field>, over: IndexMap<String, Field>) -> IndexMap<String, Field> {
	let mut merged: IndexMap<String, Field> = base
		.into_iter()
		.filter(|(name, _)| !over.contains_key(name))
		.collect();
	merged.extend(over);
	merged
}

fn declared_layer(mut fields: Vec<(String, Field)>) -> IndexMap<String, Field> {
	fields.sort_by_key(|(_, field)| field.creation_counter());
	fields.into_iter().collect()
}

/// Field declarations that are not a schema on their own
#[derive(Debug)]
pub struct Mixin {
	name: String,
	bases: Vec<Arc<Mixin>>,
	fields: Vec<(String, Field)>,
	hooks: Hooks,
}

impl Mixin {
	pub fn builder(name: impl Into<String>) -> MixinBuilder {
		MixinBuilder {
			name: name.into(),
			bases: Vec::new(),
			fields: Vec::new(),
			hooks: Hooks::default(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Ancestry first, then own declarations in declaration order
	fn collect_fields(&self) -> IndexMap<String, Field> {
		let inherited = self
			.bases
			.iter()
			.rev()
			.fold(IndexMap::new(), |acc, base| merge(acc, base.collect_fields()));
		merge(inherited, declared_layer(self.fields.clone()))
	}

	fn collect_hooks(&self) -> Hooks {
		let mut hooks = Hooks::default();
		for base in self.bases.iter().rev() {
			hooks.overlay(&base.collect_hooks());
		}
		hooks.overlay(&self.hooks);
		hooks
	}
}

pub struct MixinBuilder {
	name: String,
	bases: Vec<Arc<Mixin>>,
	fields: Vec<(String, Field)>,
	hooks: Hooks,
}

impl MixinBuilder {
	pub fn extends(mut self, base: Arc<Mixin>) -> Self {
		self.bases.push(base);
		self
	}

	pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
		self.fields.push((name.into(), field));
		self
	}

	pub fn validate_field<F>(mut self, name: impl Into<String>, hook: F) -> Self
	where
		F: Fn(Value, &Field) -> FieldResult<Value> + Send + Sync + 'static,
	{
		self.hooks.field_hooks.insert(name.into(), Arc::new(hook));
		self
	}

	pub fn build(self) -> Arc<Mixin> {
		Arc::new(Mixin {
			name: self.name,
			bases: self.bases,
			fields: self.fields,
			hooks: self.hooks,
		})
	}
}

/// A schema ancestor
#[derive(Debug, Clone)]
pub enum Base {
	Schema(Arc<Schema>),
	Mixin(Arc<Mixin>),
}

impl Base {
	fn fields(&self) -> IndexMap<String, Field> {
		match self {
			Base::Schema(schema) => schema.fields.clone(),
			Base::Mixin(mixin) => mixin.collect_fields(),
		}
	}

	fn hooks(&self) -> Hooks {
		match self {
			Base::Schema(schema) => schema.hooks.clone(),
			Base::Mixin(mixin) => mixin.collect_hooks(),
		}
	}
}

impl From<Arc<Schema>> for Base {
	fn from(schema: Arc<Schema>) -> Self {
		Base::Schema(schema)
	}
}

impl From<&Arc<Schema>> for Base {
	fn from(schema: &Arc<Schema>) -> Self {
		Base::Schema(Arc::clone(schema))
	}
}

impl From<Arc<Mixin>> for Base {
	fn from(mixin: Arc<Mixin>) -> Self {
		Base::Mixin(mixin)
	}
}

impl From<&Arc<Mixin>> for Base {
	fn from(mixin: &Arc<Mixin>) -> Self {
		Base::Mixin(Arc::clone(mixin))
	}
}

/// Assembled, immutable field template of a serializer type
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{Field, Schema};
///
/// let base = Schema::builder("Base")
///     .field("id", Field::integer().read_only())
///     .field("name", Field::string())
///     .build();
/// let child = Schema::builder("Child")
///     .extends(&base)
///     .field("id", Field::uuid().read_only())
///     .field("email", Field::string())
///     .build();
///
/// let names: Vec<&str> = child.field_names().collect();
/// assert_eq!(names, ["name", "id", "email"]);
/// assert_eq!(child.fields()["id"].type_name(), "uuid");
/// ```
pub struct Schema {
	name: String,
	fields: IndexMap<String, Field>,
	hooks: Hooks,
}

impl Schema {
	pub fn builder(name: impl Into<String>) -> SchemaBuilder {
		SchemaBuilder {
			name: name.into(),
			bases: Vec::new(),
			fields: Vec::new(),
			hooks: Hooks::default(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Unbound field templates in schema order
	pub fn fields(&self) -> &IndexMap<String, Field> {
		&self.fields
	}

	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	pub fn hooks(&self) -> &Hooks {
		&self.hooks
	}
}

impl fmt::Debug for Schema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Schema")
			.field("name", &self.name)
			.field("fields", &self.fields.keys().collect::<Vec<_>>())
			.field("hooks", &self.hooks)
			.finish()
	}
}

/// Builder assembling a [`Schema`]
pub struct SchemaBuilder {
	name: String,
	bases: Vec<Base>,
	fields: Vec<(String, Field)>,
	hooks: Hooks,
}

impl SchemaBuilder {
	/// Add an ancestor; earlier ancestors take precedence over later ones
	pub fn extends(mut self, base: impl Into<Base>) -> Self {
		self.bases.push(base.into());
		self
	}

	pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
		self.fields.push((name.into(), field));
		self
	}

	/// Hook run on `name`'s value after the field validated it
	pub fn validate_field<F>(mut self, name: impl Into<String>, hook: F) -> Self
	where
		F: Fn(Value, &Field) -> FieldResult<Value> + Send + Sync + 'static,
	{
		self.hooks.field_hooks.insert(name.into(), Arc::new(hook));
		self
	}

	/// Adjust the raw input values of all writable fields before conversion
	pub fn pre_validate<F>(mut self, hook: F) -> Self
	where
		F: Fn(Map) -> Result<Map, ValidationError> + Send + Sync + 'static,
	{
		self.hooks.pre_validate = Some(Arc::new(hook));
		self
	}

	/// Object-level validator over the converted mapping
	pub fn validator<V: Validator + 'static>(mut self, validator: V) -> Self {
		self.hooks.validators.push(Arc::new(validator));
		self
	}

	/// Final object-level validation
	pub fn validate<F>(mut self, hook: F) -> Self
	where
		F: Fn(Map, &Field) -> FieldResult<Map> + Send + Sync + 'static,
	{
		self.hooks.validate = Some(Arc::new(hook));
		self
	}

	pub fn create<F>(mut self, hook: F) -> Self
	where
		F: Fn(Map, &Field) -> Result<Value, SerializerError> + Send + Sync + 'static,
	{
		self.hooks.create = Some(Arc::new(hook));
		self
	}

	pub fn update<F>(mut self, hook: F) -> Self
	where
		F: Fn(&Value, Map, &Field) -> Result<Value, SerializerError> + Send + Sync + 'static,
	{
		self.hooks.update = Some(Arc::new(hook));
		self
	}

	pub fn build(self) -> Arc<Schema> {
		let inherited = self
			.bases
			.iter()
			.rev()
			.fold(IndexMap::new(), |acc, base| merge(acc, base.fields()));
		let fields = merge(inherited, declared_layer(self.fields));

		let mut hooks = Hooks::default();
		for base in self.bases.iter().rev() {
			hooks.overlay(&base.hooks());
		}
		hooks.overlay(&self.hooks);

		tracing::debug!(
			schema = %self.name,
			fields = ?fields.keys().collect::<Vec<_>>(),
			"schema assembled"
		);

		Arc::new(Schema {
			name: self.name,
			fields,
			hooks,
		})
	}
}
