//! Format names and their mime types

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Symbolic response format such as `html`, `json` or the catch-all `any`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Format(String);

impl Format {
	/// Create a format, lowercasing it and dropping a leading dot
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Format;
	///
	/// assert_eq!(Format::new(".JSON").as_str(), "json");
	/// ```
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(name.as_ref().trim_start_matches('.').to_ascii_lowercase())
	}

	/// The `any` sentinel accepting every requested type
	pub fn any() -> Self {
		Self("any".to_string())
	}

	pub fn html() -> Self {
		Self("html".to_string())
	}

	pub fn is_any(&self) -> bool {
		self.0 == "any"
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Format {
	fn from(name: &str) -> Self {
		Format::new(name)
	}
}

impl From<String> for Format {
	fn from(name: String) -> Self {
		Format::new(name)
	}
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Web conventions preferred over the `mime_guess` table
const DEFAULT_TYPES: &[(&str, &str)] = &[
	("html", "text/html"),
	("js", "application/javascript"),
	("xml", "application/xml"),
];

/// Legacy mime types that resolve back to a default format
const DEFAULT_REVERSE: &[(&str, &str)] = &[
	("text/javascript", "js"),
	("application/x-javascript", "js"),
	("text/xml", "xml"),
	("application/xhtml+xml", "html"),
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[("htm", "html"), ("jpeg", "jpg")];

/// Format ↔ mime-type table with format aliases
///
/// Lookups consult registered entries first and fall back to the
/// `mime_guess` extension table.
#[derive(Debug, Clone)]
pub struct MimeRegistry {
	types: BTreeMap<String, String>,
	formats: HashMap<String, String>,
	aliases: HashMap<String, String>,
}

impl MimeRegistry {
	/// Registry with the default web conventions and aliases
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::{Format, MimeRegistry};
	///
	/// let registry = MimeRegistry::new();
	/// assert_eq!(registry.mime_type(&Format::new("json")), Some("application/json"));
	/// assert_eq!(registry.mime_type(&Format::new("htm")), Some("text/html"));
	/// assert_eq!(registry.mime_type(&Format::new("webm")), Some("video/webm"));
	/// assert_eq!(registry.format_for("text/javascript"), Some(Format::new("js")));
	/// ```
	pub fn new() -> Self {
		let mut registry = Self::empty();
		for (format, mime) in DEFAULT_TYPES {
			registry.register(format, mime);
		}
		for (mime, format) in DEFAULT_REVERSE {
			registry
				.formats
				.entry((*mime).to_string())
				.or_insert_with(|| (*format).to_string());
		}
		for (from, to) in DEFAULT_ALIASES {
			registry.alias(from, to);
		}
		registry
	}

	/// Registry without registered entries or aliases
	pub fn empty() -> Self {
		Self {
			types: BTreeMap::new(),
			formats: HashMap::new(),
			aliases: HashMap::new(),
		}
	}

	/// Register `format` as `mime`
	///
	/// The first format registered for a mime type stays its canonical
	/// format for reverse lookups.
	pub fn register(&mut self, format: &str, mime: &str) {
		let format = Format::new(format);
		let mime = mime.to_ascii_lowercase();
		self.formats
			.entry(mime.clone())
			.or_insert_with(|| format.as_str().to_string());
		self.types.insert(format.0, mime);
	}

	/// Make `from` resolve to the format `to`
	pub fn alias(&mut self, from: &str, to: &str) {
		self.aliases
			.insert(Format::new(from).0, Format::new(to).0);
	}

	/// Apply the alias table to a format
	pub fn canonical(&self, format: &Format) -> Format {
		match self.aliases.get(format.as_str()) {
			Some(target) => Format(target.clone()),
			None => format.clone(),
		}
	}

	/// Mime type of a format, following aliases
	///
	/// A "format" that already looks like a mime type (contains `/`) is
	/// returned unchanged, which covers raw Accept values negotiated
	/// through `any`.
	pub fn mime_type<'a>(&'a self, format: &'a Format) -> Option<&'a str> {
		if format.as_str().contains('/') {
			return Some(format.as_str());
		}
		let canonical = self.canonical(format);
		self.types
			.get(canonical.as_str())
			.map(String::as_str)
			.or_else(|| mime_guess::from_ext(canonical.as_str()).first_raw())
	}

	/// Every format served as `mime`, registered ones first
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::{Format, MimeRegistry};
	///
	/// let formats = MimeRegistry::new().formats_for("image/jpeg");
	/// assert!(formats.contains(&Format::new("jpg")));
	/// ```
	pub fn formats_for(&self, mime: &str) -> Vec<Format> {
		let mime = mime.to_ascii_lowercase();
		let mut formats = Vec::new();
		if let Some(format) = self.formats.get(&mime) {
			formats.push(Format(format.clone()));
		}
		let known = mime_guess::get_mime_extensions_str(&mime).unwrap_or_default();
		for extension in known {
			let format = self.canonical(&Format::new(extension));
			if !formats.contains(&format) {
				formats.push(format);
			}
		}
		formats
	}

	/// Preferred format for a mime type
	pub fn format_for(&self, mime: &str) -> Option<Format> {
		self.formats_for(mime).into_iter().next()
	}
}

impl Default for MimeRegistry {
	fn default() -> Self {
		Self::new()
	}
}
