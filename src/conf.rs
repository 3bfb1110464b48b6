//! Layered application settings
//!
//! # Examples
//!
//! ```rust
//! use trellis::conf::Settings;
//!
//! let settings = Settings::from_toml_str("uri_root = \"/shop\"").unwrap();
//! assert_eq!(settings.uri_root, "/shop");
//! ```

pub use trellis_conf::*;
