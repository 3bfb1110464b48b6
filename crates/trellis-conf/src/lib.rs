//! # Trellis Conf
//!
//! Application settings consumed by the router: URL prefixes used when
//! reversing routes, content negotiation switches and the mime table.
//!
//! Settings are layered the same way for every application:
//! defaults < TOML file < environment variables.
//!
//! ## Examples
//!
//! ```
//! use trellis_conf::{Settings, SettingsBuilder, sources::{DefaultSource, TomlStrSource}};
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new())
//!     .add_source(TomlStrSource::new("uri_root = \"/blog\"\ntreat_format_as_accept = true"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(settings.uri_root, "/blog");
//! assert!(settings.treat_format_as_accept);
//! assert!(settings.serve_static);
//! ```

pub mod settings;
pub mod sources;

pub use settings::{Settings, SettingsBuilder};

use thiserror::Error;

/// Errors raised while loading settings
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid value for '{key}': {reason}")]
	InvalidValue { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SettingsError>;
