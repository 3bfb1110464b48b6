//! Controller scope in effect while routes are declared

use serde_json::{Map, Value};
use std::sync::Arc;
use trellis_http::Format;

use super::parent::ParentResource;

/// Settings inherited by every route declared inside a controller block
#[derive(Debug, Clone, Default)]
pub struct ScopeContext {
	pub controllers: Vec<String>,
	pub parents: Vec<Arc<ParentResource>>,
	pub provides: Vec<Format>,
	/// Append the optional format suffix to every route
	pub use_format: bool,
	/// Replaces the controller path in front of every route
	pub base_map: Option<String>,
	pub default_values: Map<String, Value>,
}

impl ScopeContext {
	/// Top-level scope without a controller
	pub fn new() -> Self {
		Self::default()
	}

	/// Enter a (nested) controller
	pub fn with_controller(mut self, name: impl Into<String>) -> Self {
		self.controllers.push(name.into());
		self
	}

	pub fn with_parent(mut self, parent: ParentResource) -> Self {
		self.parents.push(Arc::new(parent));
		self
	}

	pub fn with_provides<I, F>(mut self, formats: I) -> Self
	where
		I: IntoIterator<Item = F>,
		F: Into<Format>,
	{
		self.provides = formats.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_use_format(mut self, use_format: bool) -> Self {
		self.use_format = use_format;
		self
	}

	pub fn with_base_map(mut self, map: impl Into<String>) -> Self {
		self.base_map = Some(map.into());
		self
	}

	pub fn with_default_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.default_values.insert(key.into(), value);
		self
	}

	pub fn has_controller(&self) -> bool {
		!self.controllers.is_empty()
	}

	/// Controller names joined by `/`
	pub fn controller_path(&self) -> String {
		self.controllers.join("/")
	}

	/// Controller names joined by `_`, the prefix of route names
	pub fn controller_name(&self) -> String {
		self.controllers.join("_")
	}
}
