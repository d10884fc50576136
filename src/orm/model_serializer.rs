use super::adapter::{ColumnType, ModelAdapter};
use crate::field::Field;
use crate::serializers::{Base, Schema};
use crate::value::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Leaf field marshalling a column of `column_type`, if one exists
pub fn field_for_column(column_type: &ColumnType) -> Option<Field> {
	match column_type {
		ColumnType::String | ColumnType::Inet => Some(Field::string()),
		ColumnType::Integer | ColumnType::BigInteger => Some(Field::integer()),
		ColumnType::Numeric => Some(Field::float()),
		ColumnType::Boolean => Some(Field::boolean()),
		ColumnType::Date => Some(Field::date()),
		ColumnType::DateTime => Some(Field::datetime()),
		ColumnType::Uuid => Some(Field::uuid()),
		ColumnType::Json => Some(Field::json()),
		ColumnType::Other(_) => None,
	}
}

/// Derives a [`Schema`] from a model's columns
///
/// Columns are mapped to leaf fields in declaration order. Primary keys and
/// the names listed in `read_only` become read-only, nullable columns become
/// optional, and columns with no mapped field type are skipped. Fields
/// declared explicitly replace derived ones of the same name. `create` and
/// `update` go through the adapter.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::orm::{Column, ColumnType, ModelAdapter, ModelSchemaBuilder};
/// use reinhardt_marshal::{Map, SerializerError, Value};
/// use std::sync::Arc;
///
/// struct Books;
///
/// impl ModelAdapter for Books {
///     fn model_name(&self) -> &str {
///         "Book"
///     }
///
///     fn columns(&self) -> Vec<Column> {
///         vec![
///             Column::new("id", ColumnType::Integer).primary_key(),
///             Column::new("title", ColumnType::String),
///         ]
///     }
///
///     fn get(&self, _key: &Value) -> Option<Value> {
///         None
///     }
///
///     fn create(&self, data: Map) -> Result<Value, SerializerError> {
///         Ok(Value::Map(data))
///     }
///
///     fn update(&self, _instance: &Value, data: Map) -> Result<Value, SerializerError> {
///         Ok(Value::Map(data))
///     }
/// }
///
/// let schema = ModelSchemaBuilder::new(Arc::new(Books)).build();
/// assert!(schema.fields()["id"].is_read_only());
/// assert!(schema.fields()["title"].is_required());
/// ```
pub struct ModelSchemaBuilder {
	adapter: Arc<dyn ModelAdapter>,
	name: String,
	bases: Vec<Base>,
	fields: Option<Vec<String>>,
	exclude: Vec<String>,
	read_only: Vec<String>,
	write_only: Vec<String>,
	declared: Vec<(String, Field)>,
}

impl ModelSchemaBuilder {
	pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
		Self {
			name: adapter.model_name().to_string(),
			adapter,
			bases: Vec::new(),
			fields: None,
			exclude: Vec::new(),
			read_only: Vec::new(),
			write_only: Vec::new(),
			declared: Vec::new(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn extends(mut self, base: impl Into<Base>) -> Self {
		self.bases.push(base.into());
		self
	}

	/// Only derive fields for these columns
	pub fn fields<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields = Some(names.into_iter().map(Into::into).collect());
		self
	}

	pub fn exclude<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.exclude.extend(names.into_iter().map(Into::into));
		self
	}

	pub fn read_only<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.read_only.extend(names.into_iter().map(Into::into));
		self
	}

	pub fn write_only<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.write_only.extend(names.into_iter().map(Into::into));
		self
	}

	/// Declare a field explicitly; it wins over a derived field of that name
	pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
		self.declared.push((name.into(), field));
		self
	}

	fn includes(&self, name: &str) -> bool {
		let listed = self
			.fields
			.as_ref()
			.is_none_or(|fields| fields.iter().any(|f| f == name));
		listed && !self.exclude.iter().any(|f| f == name)
	}

	fn derived_schema(&self) -> Arc<Schema> {
		let declared: HashSet<&str> = self.declared.iter().map(|(name, _)| name.as_str()).collect();
		let mut builder = Schema::builder(format!("{}Columns", self.name));

		for column in self.adapter.columns() {
			if !self.includes(&column.name) || declared.contains(column.name.as_str()) {
				continue;
			}
			let Some(mut field) = field_for_column(&column.column_type) else {
				tracing::debug!(
					model = self.adapter.model_name(),
					column = %column.name,
					column_type = ?column.column_type,
					"no field type for column, skipping"
				);
				continue;
			};

			if column.primary_key || self.read_only.contains(&column.name) {
				field = field.read_only();
			} else if self.write_only.contains(&column.name) {
				field = field.write_only();
			}
			if column.nullable {
				field = field.optional();
			}
			builder = builder.field(column.name, field);
		}
		builder.build()
	}

	pub fn build(self) -> Arc<Schema> {
		let derived = self.derived_schema();
		let create_adapter = Arc::clone(&self.adapter);
		let update_adapter = Arc::clone(&self.adapter);

		let mut builder = Schema::builder(self.name);
		for base in self.bases {
			builder = builder.extends(base);
		}
		builder = builder.extends(derived);
		for (name, field) in self.declared {
			builder = builder.field(name, field);
		}
		builder
			.create(move |data: Map, _: &Field| create_adapter.create(data))
			.update(move |instance: &Value, data: Map, _: &Field| update_adapter.update(instance, data))
			.build()
	}
}
