//! Domain-model collaborator
//!
//! The marshalling core knows nothing about storage. A [`ModelAdapter`]
//! describes one modeled entity type (its columns and primary key) and
//! performs the lookups and writes that model-backed schemas need.

use crate::errors::SerializerError;
use crate::value::{Map, Value};

/// Column types a model may declare
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColumnType {
	/// VARCHAR / TEXT
	String,
	/// Network address stored as text
	Inet,
	/// INTEGER
	Integer,
	/// BIGINT
	BigInteger,
	/// NUMERIC / DECIMAL, marshalled as a float
	Numeric,
	/// BOOLEAN
	Boolean,
	/// DATE
	Date,
	/// TIMESTAMP WITH TIME ZONE
	DateTime,
	/// UUID
	Uuid,
	/// JSON / JSONB
	Json,
	/// Any other database-specific type
	Other(String),
}

/// One column of a modeled entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	pub name: String,
	pub column_type: ColumnType,
	pub nullable: bool,
	pub primary_key: bool,
}

impl Column {
	pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
		Self {
			name: name.into(),
			column_type,
			nullable: false,
			primary_key: false,
		}
	}

	pub fn nullable(mut self) -> Self {
		self.nullable = true;
		self
	}

	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self
	}
}

/// Storage-side operations for one model
pub trait ModelAdapter: Send + Sync {
	fn model_name(&self) -> &str;

	/// Columns in declaration order
	fn columns(&self) -> Vec<Column>;

	fn primary_key(&self) -> Option<Column> {
		self.columns().into_iter().find(|column| column.primary_key)
	}

	/// Entity whose primary key equals `key`
	fn get(&self, key: &Value) -> Option<Value>;

	fn create(&self, data: Map) -> Result<Value, SerializerError>;

	fn update(&self, instance: &Value, data: Map) -> Result<Value, SerializerError>;
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Mutex;

	/// Map-backed adapter keyed by an integer `id`
	#[derive(Debug)]
	pub(crate) struct MemoryAdapter {
		pub(crate) name: &'static str,
		pub(crate) columns: Vec<Column>,
		pub(crate) rows: Mutex<Vec<Map>>,
	}

	impl MemoryAdapter {
		pub(crate) fn people() -> Self {
			Self {
				name: "Person",
				columns: vec![
					Column::new("id", ColumnType::Integer).primary_key(),
					Column::new("name", ColumnType::String),
					Column::new("nickname", ColumnType::String).nullable(),
					Column::new("born", ColumnType::Date).nullable(),
					Column::new("address", ColumnType::Inet).nullable(),
					Column::new("location", ColumnType::Other("geometry".to_string())),
				],
				rows: Mutex::new(Vec::new()),
			}
		}

		pub(crate) fn insert(&self, row: Value) {
			if let Value::Map(row) = row {
				self.rows.lock().unwrap().push(row);
			}
		}
	}

	impl ModelAdapter for MemoryAdapter {
		fn model_name(&self) -> &str {
			self.name
		}

		fn columns(&self) -> Vec<Column> {
			self.columns.clone()
		}

		fn get(&self, key: &Value) -> Option<Value> {
			self.rows
				.lock()
				.unwrap()
				.iter()
				.find(|row| row.get("id") == Some(key))
				.cloned()
				.map(Value::Map)
		}

		fn create(&self, mut data: Map) -> Result<Value, SerializerError> {
			let mut rows = self.rows.lock().map_err(|e| SerializerError::Save(e.to_string()))?;
			data.insert("id".to_string(), Value::Int(rows.len() as i64 + 1));
			rows.push(data.clone());
			Ok(Value::Map(data))
		}

		fn update(&self, instance: &Value, data: Map) -> Result<Value, SerializerError> {
			let key = instance
				.get("id")
				.cloned()
				.ok_or_else(|| SerializerError::Save("instance has no id".to_string()))?;
			let mut rows = self.rows.lock().map_err(|e| SerializerError::Save(e.to_string()))?;
			let row = rows
				.iter_mut()
				.find(|row| row.get("id") == Some(&key))
				.ok_or_else(|| SerializerError::Save(format!("no row with id {key}")))?;
			row.extend(data);
			Ok(Value::Map(row.clone()))
		}
	}

	#[rstest]
	fn test_primary_key_defaults_to_flagged_column() {
		let adapter = MemoryAdapter::people();
		assert_eq!(adapter.primary_key().map(|c| c.name), Some("id".to_string()));
	}

	#[rstest]
	fn test_create_then_get() {
		// Arrange
		let adapter = MemoryAdapter::people();
		let data: Map = [("name".to_string(), Value::from("Ada"))].into_iter().collect();

		// Act
		let created = adapter.create(data).unwrap();

		// Assert
		assert_eq!(created.get("id"), Some(&Value::Int(1)));
		assert_eq!(adapter.get(&Value::Int(1)), Some(created));
		assert_eq!(adapter.get(&Value::Int(2)), None);
	}
}
