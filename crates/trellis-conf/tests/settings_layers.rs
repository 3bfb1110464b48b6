//! Layering of defaults, TOML files and environment overrides

use rstest::rstest;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use trellis_conf::{Settings, SettingsError};

fn write_settings(content: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(content.as_bytes()).unwrap();
	file
}

#[rstest]
fn test_from_file_overrides_defaults() {
	let file = write_settings(
		r#"
uri_root = "/shop"
treat_format_as_accept = true

[mime_types]
yaml = "application/yaml"
"#,
	);

	let settings = Settings::from_file(file.path()).unwrap();
	assert_eq!(settings.uri_root, "/shop");
	assert!(settings.treat_format_as_accept);
	assert!(settings.serve_static);
	assert_eq!(
		settings.mime_types.get("yaml").map(String::as_str),
		Some("application/yaml")
	);
}

#[rstest]
fn test_from_missing_file_is_default() {
	let settings = Settings::from_file("/nonexistent/trellis.toml").unwrap();
	assert_eq!(settings, Settings::default());
}

#[rstest]
fn test_wrong_type_is_reported() {
	let result = Settings::from_toml_str("uri_root = 12");
	assert!(matches!(result, Err(SettingsError::Json(_))));
}

#[rstest]
#[serial(env)]
fn test_env_overrides_file() {
	let file = write_settings("uri_root = \"/from-file\"\nserve_static = true\n");
	let mut settings = Settings::from_file(file.path()).unwrap();

	unsafe {
		std::env::set_var("TRELLIS_IT_URI_ROOT", "/from-env");
		std::env::set_var("TRELLIS_IT_BASE_URI", "/proxy");
		std::env::set_var("TRELLIS_IT_SERVE_STATIC", "0");
		std::env::set_var("TRELLIS_IT_TREAT_FORMAT_AS_ACCEPT", "yes");
	}

	let result = settings.apply_env("TRELLIS_IT_");

	unsafe {
		std::env::remove_var("TRELLIS_IT_URI_ROOT");
		std::env::remove_var("TRELLIS_IT_BASE_URI");
		std::env::remove_var("TRELLIS_IT_SERVE_STATIC");
		std::env::remove_var("TRELLIS_IT_TREAT_FORMAT_AS_ACCEPT");
	}

	result.unwrap();
	assert_eq!(settings.uri_root, "/from-env");
	assert_eq!(settings.base_path.as_deref(), Some("/proxy"));
	assert!(!settings.serve_static);
	assert!(settings.treat_format_as_accept);
}

#[rstest]
#[serial(env)]
fn test_env_rejects_invalid_boolean() {
	unsafe {
		std::env::set_var("TRELLIS_BAD_SERVE_STATIC", "sometimes");
	}
	let mut settings = Settings::default();
	let result = settings.apply_env("TRELLIS_BAD_");
	unsafe {
		std::env::remove_var("TRELLIS_BAD_SERVE_STATIC");
	}

	assert!(matches!(
		result,
		Err(SettingsError::InvalidValue { ref key, .. }) if key == "serve_static"
	));
}
