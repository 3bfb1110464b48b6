//! Application settings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use trellis_http::MimeRegistry;

use crate::Result;
use crate::sources::{ConfigSource, EnvSource, TomlFileSource, TomlStrSource, coerce_bool};

const BOOL_KEYS: &[&str] = &["treat_format_as_accept", "serve_static"];

/// Settings read by the router and the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Mount point of the application, prepended to every generated URL
	pub uri_root: String,
	/// External prefix placed in front of `uri_root`
	pub base_path: Option<String>,
	/// Reject a request whose URL extension is not provided by the route
	pub treat_format_as_accept: bool,
	/// Answer GET and HEAD requests from the static file provider first
	pub serve_static: bool,
	pub default_charset: String,
	/// Extra format to mime type registrations
	pub mime_types: BTreeMap<String, String>,
	pub format_aliases: BTreeMap<String, String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			uri_root: "/".to_string(),
			base_path: None,
			treat_format_as_accept: false,
			serve_static: true,
			default_charset: "utf-8".to_string(),
			mime_types: BTreeMap::new(),
			format_aliases: BTreeMap::from([("htm".to_string(), "html".to_string())]),
		}
	}
}

impl Settings {
	/// Defaults overlaid with a TOML document
	///
	/// # Examples
	///
	/// ```
	/// use trellis_conf::Settings;
	///
	/// let settings = Settings::from_toml_str("serve_static = false").unwrap();
	/// assert!(!settings.serve_static);
	/// assert_eq!(settings.uri_root, "/");
	/// ```
	pub fn from_toml_str(content: &str) -> Result<Self> {
		SettingsBuilder::new()
			.add_source(TomlStrSource::new(content))
			.build()
	}

	/// Defaults overlaid with a TOML file; a missing file yields the defaults
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		SettingsBuilder::new()
			.add_source(TomlFileSource::new(path))
			.build()
	}

	/// Override fields from environment variables starting with `prefix`
	///
	/// `{prefix}URI_ROOT`, `{prefix}BASE_URI`, `{prefix}TREAT_FORMAT_AS_ACCEPT`
	/// and `{prefix}SERVE_STATIC` are recognised.
	pub fn apply_env(&mut self, prefix: &str) -> Result<()> {
		let source = EnvSource::new(prefix).with_rename("base_uri", "base_path");
		let values = source.load()?;
		self.apply_overrides(&values)
	}

	/// Override fields from a flat key/value map
	///
	/// Unknown keys are ignored.
	pub fn apply_overrides(&mut self, values: &IndexMap<String, Value>) -> Result<()> {
		for (key, value) in values {
			match key.as_str() {
				"uri_root" => {
					if let Some(s) = value.as_str() {
						self.uri_root = s.to_string();
					}
				}
				"base_path" => {
					self.base_path = value
						.as_str()
						.filter(|s| !s.is_empty())
						.map(str::to_string);
				}
				"treat_format_as_accept" => {
					self.treat_format_as_accept = coerce_bool(key, value)?;
				}
				"serve_static" => self.serve_static = coerce_bool(key, value)?,
				"default_charset" => {
					if let Some(s) = value.as_str() {
						self.default_charset = s.to_string();
					}
				}
				_ => {}
			}
		}
		Ok(())
	}

	/// Mime table with the configured registrations and aliases applied
	///
	/// # Examples
	///
	/// ```
	/// use trellis_conf::Settings;
	/// use trellis_http::Format;
	///
	/// let settings = Settings::from_toml_str(
	///     "[mime_types]\nyaml = \"application/yaml\"\n[format_aliases]\nyml = \"yaml\"",
	/// )
	/// .unwrap();
	/// let registry = settings.mime_registry();
	/// assert_eq!(registry.mime_type(&Format::new("yml")), Some("application/yaml"));
	/// ```
	pub fn mime_registry(&self) -> MimeRegistry {
		let mut registry = MimeRegistry::new();
		for (format, mime) in &self.mime_types {
			registry.register(format, mime);
		}
		for (from, to) in &self.format_aliases {
			registry.alias(from, to);
		}
		registry
	}
}

/// Merges configuration sources into [`Settings`]
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a configuration source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Load every source in priority order and deserialize the result
	pub fn build(mut self) -> Result<Settings> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = serde_json::Map::new();
		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"loaded settings source"
			);
			for (key, value) in values {
				merged.insert(key, value);
			}
		}

		for key in BOOL_KEYS {
			if let Some(value) = merged.get(*key) {
				let flag = coerce_bool(key, value)?;
				merged.insert((*key).to_string(), Value::Bool(flag));
			}
		}

		Ok(serde_json::from_value(Value::Object(merged))?)
	}
}
