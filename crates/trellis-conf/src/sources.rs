//! Configuration sources
//!
//! Each source yields a flat map of setting keys to JSON values. Sources are
//! merged in ascending priority so later layers override earlier ones.

use indexmap::IndexMap;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};

use crate::{Result, SettingsError};

/// A layer of settings values
pub trait ConfigSource: Send + Sync {
	/// Load configuration values from this source
	fn load(&self) -> Result<IndexMap<String, Value>>;

	/// Get the priority of this source (higher priority overrides lower)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Built-in defaults, optionally extended with explicit values
#[derive(Debug, Clone, Default)]
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a default value
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

fn table_to_map(table: toml::Table) -> Result<IndexMap<String, Value>> {
	let mut map = IndexMap::new();
	for (key, value) in table {
		map.insert(key, serde_json::to_value(value)?);
	}
	Ok(map)
}

/// TOML file source
///
/// A missing file contributes nothing.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
		}
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>> {
		if !self.path.exists() {
			tracing::debug!(path = %self.path.display(), "settings file not found, skipping");
			return Ok(IndexMap::new());
		}
		let content = std::fs::read_to_string(&self.path)?;
		let table: toml::Table = toml::from_str(&content)?;
		table_to_map(table)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// TOML document held in memory
#[derive(Debug, Clone)]
pub struct TomlStrSource {
	content: String,
}

impl TomlStrSource {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
		}
	}
}

impl ConfigSource for TomlStrSource {
	fn load(&self) -> Result<IndexMap<String, Value>> {
		let table: toml::Table = toml::from_str(&self.content)?;
		table_to_map(table)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		"TOML string".to_string()
	}
}

/// Environment variable source
///
/// Variables starting with the prefix are collected with the prefix removed
/// and the remainder lowercased, so `TRELLIS_URI_ROOT` becomes `uri_root`.
#[derive(Debug, Clone)]
pub struct EnvSource {
	prefix: String,
	renames: IndexMap<String, String>,
}

impl EnvSource {
	/// Create a new environment source with the given prefix
	///
	/// # Examples
	///
	/// ```
	/// use trellis_conf::sources::EnvSource;
	///
	/// let source = EnvSource::new("TRELLIS_").with_rename("base_uri", "base_path");
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			renames: IndexMap::new(),
		}
	}

	/// Store the variable named `from` (after prefix removal) under `to`
	pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
		self.renames.insert(from.into(), to.into());
		self
	}

	fn parse_value(value: &str) -> Value {
		match value.to_ascii_lowercase().as_str() {
			"true" | "yes" | "on" => Value::Bool(true),
			"false" | "no" | "off" => Value::Bool(false),
			_ => Value::String(value.to_string()),
		}
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>> {
		let mut map = IndexMap::new();
		for (key, value) in env::vars() {
			let Some(stripped) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			if stripped.is_empty() {
				continue;
			}
			let name = stripped.to_ascii_lowercase();
			let name = self.renames.get(&name).cloned().unwrap_or(name);
			map.insert(name, Self::parse_value(&value));
		}
		Ok(map)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// Interpret a value as a boolean, accepting the string spellings used by
/// environment variables
pub(crate) fn coerce_bool(key: &str, value: &Value) -> Result<bool> {
	match value {
		Value::Bool(b) => Ok(*b),
		Value::String(s) => match s.to_ascii_lowercase().as_str() {
			"1" | "true" | "yes" | "on" => Ok(true),
			"0" | "false" | "no" | "off" | "" => Ok(false),
			other => Err(SettingsError::InvalidValue {
				key: key.to_string(),
				reason: format!("expected a boolean, got '{}'", other),
			}),
		},
		Value::Number(n) => Ok(n.as_i64().is_some_and(|n| n != 0)),
		other => Err(SettingsError::InvalidValue {
			key: key.to_string(),
			reason: format!("expected a boolean, got {}", other),
		}),
	}
}
