//! Request-scoped context and binding handles

use crate::config::Settings;
use crate::value::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct ContextInner {
	values: Map,
	settings: Arc<Settings>,
}

/// Request-scoped values shared by every field of a serializer tree
///
/// Cloning is cheap; the data is shared behind an `Arc`.
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::{Context, Value};
///
/// let context = Context::new().with("locale", "en-GB");
/// assert_eq!(context.get("locale"), Some(&Value::from("en-GB")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
	inner: Arc<ContextInner>,
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		Arc::make_mut(&mut self.inner)
			.values
			.insert(key.into(), value.into());
		self
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		Arc::make_mut(&mut self.inner).settings = Arc::new(settings);
		self
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.values.get(key)
	}

	pub fn values(&self) -> &Map {
		&self.inner.values
	}

	pub fn settings(&self) -> &Settings {
		&self.inner.settings
	}
}

/// Handle recorded on a field when it is bound to its owning composite
///
/// The handle never owns the parent; it carries the parent's name, the
/// root's name and the root's context, so the tree stays acyclic.
#[derive(Debug, Clone)]
pub struct Parent {
	name: Arc<str>,
	root: Arc<str>,
	context: Context,
}

impl Parent {
	/// Handle for the outermost composite of a tree
	pub fn root(name: impl Into<Arc<str>>, context: Context) -> Self {
		let name = name.into();
		Self {
			root: Arc::clone(&name),
			name,
			context,
		}
	}

	/// Handle for a composite nested under this one
	pub fn child(&self, name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			root: Arc::clone(&self.root),
			context: self.context.clone(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn root_name(&self) -> &str {
		&self.root
	}

	pub fn context(&self) -> &Context {
		&self.context
	}
}
