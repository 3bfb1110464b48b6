//! URL generation from compiled routes
//!
//! Positional values fill the route's placeholders in declaration order,
//! keyed values fill the rest. Values left over after the path is written
//! become the query string. The result is mounted under the application root
//! and the external base path.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::RouteError;
use super::route::CompiledRoute;

/// Turns a scalar parameter value into its URL text
///
/// Returning `None` drops the value.
pub type ValueCoercion = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

fn default_coercion(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// Normalize parameter values for generation
///
/// Arrays map each element, objects recurse, nulls are dropped and scalars
/// go through `coerce`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::sync::Arc;
/// use trellis_urls::routers::reverse::normalize_values;
///
/// let coerce: trellis_urls::ValueCoercion = Arc::new(|v: &serde_json::Value| Some(v.to_string().trim_matches('"').to_string()));
/// let values = json!({"id": 5, "tags": ["a", null], "filter": {"q": "x", "none": null}, "gone": null});
/// let normalized = normalize_values(values.as_object().unwrap(), &coerce);
/// assert_eq!(
///     serde_json::Value::Object(normalized),
///     json!({"id": "5", "tags": ["a"], "filter": {"q": "x"}})
/// );
/// ```
pub fn normalize_values(values: &Map<String, Value>, coerce: &ValueCoercion) -> Map<String, Value> {
	values
		.iter()
		.filter_map(|(key, value)| normalize_value(value, coerce).map(|value| (key.clone(), value)))
		.collect()
}

fn normalize_value(value: &Value, coerce: &ValueCoercion) -> Option<Value> {
	match value {
		Value::Null => None,
		Value::Array(items) => Some(Value::Array(
			items
				.iter()
				.filter_map(|item| normalize_value(item, coerce))
				.collect(),
		)),
		Value::Object(map) => Some(Value::Object(normalize_values(map, coerce))),
		scalar => coerce(scalar).map(Value::String),
	}
}

/// One leading slash, no trailing slash; the root collapses to an empty string
fn conform_uri(uri: &str) -> String {
	let trimmed = uri.trim_matches('/');
	if trimmed.is_empty() {
		String::new()
	} else {
		format!("/{}", trimmed)
	}
}

/// Mount `url` under the application root and the external base path
///
/// # Examples
///
/// ```
/// use trellis_urls::routers::reverse::rebase_url;
///
/// assert_eq!(rebase_url("/posts", "/blog/", Some("app")), "/app/blog/posts");
/// assert_eq!(rebase_url("", "/", None), "/");
/// ```
pub fn rebase_url(url: &str, uri_root: &str, base_path: Option<&str>) -> String {
	let mut out = String::new();
	if let Some(base) = base_path {
		out.push_str(&conform_uri(base));
	}
	out.push_str(&conform_uri(uri_root));
	out.push_str(url);
	if out.is_empty() { "/".to_string() } else { out }
}

fn flatten_query(prefix: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
	match value {
		Value::Array(items) => {
			let key = format!("{}[]", prefix);
			for item in items {
				flatten_query(&key, item, pairs);
			}
		}
		Value::Object(map) => {
			for (sub, item) in map {
				flatten_query(&format!("{}[{}]", prefix, sub), item, pairs);
			}
		}
		Value::String(s) => pairs.push((prefix.to_string(), s.clone())),
		Value::Null => {}
		other => pairs.push((prefix.to_string(), other.to_string())),
	}
}

/// Generates URLs for compiled routes
#[derive(Clone)]
pub struct UrlBuilder {
	uri_root: String,
	base_path: Option<String>,
	coercion: ValueCoercion,
}

impl fmt::Debug for UrlBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UrlBuilder")
			.field("uri_root", &self.uri_root)
			.field("base_path", &self.base_path)
			.finish_non_exhaustive()
	}
}

impl Default for UrlBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl UrlBuilder {
	pub fn new() -> Self {
		Self {
			uri_root: "/".to_string(),
			base_path: None,
			coercion: Arc::new(default_coercion),
		}
	}

	/// Mount point of the application
	pub fn with_uri_root(mut self, uri_root: impl Into<String>) -> Self {
		self.uri_root = uri_root.into();
		self
	}

	/// External prefix placed in front of the mount point
	pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
		self.base_path = Some(base_path.into());
		self
	}

	/// Replace the scalar-to-text conversion
	pub fn with_coercion(mut self, coercion: ValueCoercion) -> Self {
		self.coercion = coercion;
		self
	}

	pub fn uri_root(&self) -> &str {
		&self.uri_root
	}

	pub fn base_path(&self) -> Option<&str> {
		self.base_path.as_deref()
	}

	/// Build the URL of `route`
	///
	/// # Examples
	///
	/// ```
	/// use serde_json::json;
	/// use trellis_urls::{CompiledRoute, RouteSpec, ScopeContext, UrlBuilder};
	///
	/// let route = CompiledRoute::compile(&RouteSpec::get("/posts/:id").with_name("post"), &ScopeContext::new()).unwrap();
	/// let builder = UrlBuilder::new().with_uri_root("/blog");
	///
	/// let url = builder.build(&route, &[json!(3)], json!({"page": 2}).as_object().unwrap()).unwrap();
	/// assert_eq!(url, "/blog/posts/3?page=2");
	/// ```
	pub fn build(
		&self,
		route: &CompiledRoute,
		positional: &[Value],
		keyed: &Map<String, Value>,
	) -> Result<String, RouteError> {
		let name = route.name().unwrap_or(route.path.as_str());
		let Some(generator) = route.generator() else {
			return Err(RouteError::unrecognized(
				name,
				"regex route without a generation template",
			));
		};

		let names = generator.param_names();
		if positional.len() > names.len() {
			return Err(RouteError::unrecognized(
				name,
				format!(
					"{} positional values given for {} placeholders",
					positional.len(),
					names.len()
				),
			));
		}

		let mut values = Map::new();
		for (placeholder, value) in names.iter().zip(positional) {
			values.insert(placeholder.clone(), value.clone());
		}
		for (key, value) in keyed {
			values.insert(key.clone(), value.clone());
		}
		let mut values = normalize_values(&values, &self.coercion);

		let mut consumed = Vec::new();
		let mut url = generator
			.generate(&values, &mut consumed)
			.map_err(|reason| RouteError::unrecognized(name, reason))?;

		for key in &consumed {
			values.remove(key);
		}
		if !values.is_empty() {
			let mut pairs = Vec::new();
			for (key, value) in &values {
				flatten_query(key, value, &mut pairs);
			}
			if !pairs.is_empty() {
				url.push('?');
				url.push_str(&serde_urlencoded::to_string(&pairs)?);
			}
		}

		Ok(rebase_url(&url, &self.uri_root, self.base_path.as_deref()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::routers::route::{PathDescriptor, RouteSpec};
	use crate::routers::scope::ScopeContext;
	use rstest::rstest;
	use serde_json::json;

	fn route(spec: RouteSpec) -> CompiledRoute {
		CompiledRoute::compile(&spec, &ScopeContext::new()).unwrap()
	}

	fn keyed(value: Value) -> Map<String, Value> {
		value.as_object().cloned().unwrap_or_default()
	}

	#[rstest]
	#[case("/", "/", None, "/")]
	#[case("/posts", "/", None, "/posts")]
	#[case("/posts", "blog", None, "/blog/posts")]
	#[case("/posts", "/blog/", Some("/proxy/"), "/proxy/blog/posts")]
	#[case("/", "/blog", None, "/blog/")]
	fn test_rebase_url(
		#[case] url: &str,
		#[case] root: &str,
		#[case] base: Option<&str>,
		#[case] expected: &str,
	) {
		assert_eq!(rebase_url(url, root, base), expected);
	}

	#[rstest]
	fn test_keyed_override_positional() {
		let route = route(RouteSpec::get("/users/:id/posts/:post_id"));
		let url = UrlBuilder::new()
			.build(&route, &[json!(1), json!(2)], &keyed(json!({"post_id": 9})))
			.unwrap();
		assert_eq!(url, "/users/1/posts/9");
	}

	#[rstest]
	fn test_too_many_positional_values() {
		let route = route(RouteSpec::get("/users/:id").with_name("user"));
		let err = UrlBuilder::new()
			.build(&route, &[json!(1), json!(2)], &Map::new())
			.unwrap_err();
		assert!(matches!(err, RouteError::UnrecognizedRoute { ref name, .. } if name == "user"));
	}

	#[rstest]
	fn test_missing_parameter() {
		let route = route(RouteSpec::get("/users/:id").with_name("user"));
		let err = UrlBuilder::new().build(&route, &[], &Map::new()).unwrap_err();
		assert!(matches!(err, RouteError::UnrecognizedRoute { .. }));
	}

	#[rstest]
	fn test_leftover_values_become_query() {
		let route = route(RouteSpec::get("/search"));
		let url = UrlBuilder::new()
			.build(
				&route,
				&[],
				&keyed(json!({"q": "rust lang", "tags": ["a", "b"], "range": {"from": 1}, "skip": null})),
			)
			.unwrap();
		assert_eq!(
			url,
			"/search?q=rust+lang&range%5Bfrom%5D=1&tags%5B%5D=a&tags%5B%5D=b"
		);
	}

	#[rstest]
	fn test_partial_optional_group_goes_to_query() {
		let route = route(RouteSpec::get("/list(/:year/:month)"));
		let url = UrlBuilder::new()
			.build(&route, &[], &keyed(json!({"year": 2024})))
			.unwrap();
		assert_eq!(url, "/list?year=2024");
	}

	#[rstest]
	fn test_regex_route_without_template() {
		let route = route(RouteSpec::get(PathDescriptor::pattern(r"/(\d+)")).with_name("numbered"));
		let err = UrlBuilder::new().build(&route, &[], &Map::new()).unwrap_err();
		assert!(matches!(err, RouteError::UnrecognizedRoute { ref name, .. } if name == "numbered"));
	}

	#[rstest]
	fn test_regex_route_with_template() {
		let route = route(
			RouteSpec::get(PathDescriptor::pattern(r"/(?P<id>\d+)"))
				.with_name("numbered")
				.with_generate_with("/:id"),
		);
		let url = UrlBuilder::new().build(&route, &[json!(42)], &Map::new()).unwrap();
		assert_eq!(url, "/42");
	}

	#[rstest]
	fn test_custom_coercion() {
		let route = route(RouteSpec::get("/items/:id"));
		let builder = UrlBuilder::new().with_coercion(Arc::new(|value: &Value| match value {
			Value::Bool(true) => Some("yes".to_string()),
			Value::Bool(false) => None,
			other => default_coercion(other),
		}));
		let url = builder
			.build(&route, &[json!(7)], &keyed(json!({"draft": true, "hidden": false})))
			.unwrap();
		assert_eq!(url, "/items/7?draft=yes");
	}
}
