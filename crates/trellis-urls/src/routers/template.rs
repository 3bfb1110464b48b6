//! Path normalization
//!
//! Turns a route declaration plus the controller scope it was declared in
//! into the canonical template the matcher compiles and the name used for
//! reversal.

use serde_json::{Map, Value};
use std::sync::Arc;
use trellis_http::Format;

use super::parent::{self, ParentResource};
use super::route::{PathDescriptor, RouteSpec};
use super::scope::ScopeContext;

/// Optional format extension appended to routes that provide formats
pub const FORMAT_SUFFIX: &str = "(.:format)";

/// Result of normalizing a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRoute {
	/// Canonical template, or the regex source of a pattern route
	pub path: String,
	pub name: Option<String>,
	pub parents: Vec<Arc<ParentResource>>,
	pub provides: Vec<Format>,
	pub default_values: Map<String, Value>,
	pub is_pattern: bool,
}

fn squeeze_slashes(path: &str) -> String {
	let mut out = String::with_capacity(path.len());
	for c in path.chars() {
		if c == '/' && out.ends_with('/') {
			continue;
		}
		out.push(c);
	}
	out
}

/// `File.join`-style concatenation: exactly one `/` between the parts
fn join_path(head: &str, tail: &str) -> String {
	format!(
		"{}/{}",
		head.trim_end_matches('/'),
		tail.trim_start_matches('/')
	)
}

fn ensure_leading_slash(path: String) -> String {
	if path.starts_with('/') || path.starts_with("(/") {
		path
	} else {
		format!("/{}", path)
	}
}

/// Canonical form of a path template
///
/// Repeated slashes collapse, the template gets a leading slash and loses its
/// trailing one (the root `/` is kept), a slash in front of the format group
/// is dropped and a trailing `/?` becomes an optional-slash group.
///
/// # Examples
///
/// ```
/// use trellis_urls::normalize_template;
///
/// assert_eq!(normalize_template("product//list/"), "/product/list");
/// assert_eq!(normalize_template("/list/(.:format)"), "/list(.:format)");
/// assert_eq!(normalize_template("/show/?"), "/show(/)");
/// assert_eq!(normalize_template("/"), "/");
/// assert_eq!(normalize_template("/(.:format)"), "/(.:format)");
/// ```
pub fn normalize_template(path: &str) -> String {
	let mut path = squeeze_slashes(path);

	let optional_slash = path.ends_with("/?");
	if optional_slash {
		path.truncate(path.len() - 2);
	}

	path = ensure_leading_slash(path);
	path = path.replace("/(.", "(.");

	if path.len() > 1 && path.ends_with('/') {
		path.pop();
	}
	if path.ends_with("/)") && !path.ends_with("(/)") {
		path.truncate(path.len() - 2);
		path.push(')');
	}

	path = squeeze_slashes(&ensure_leading_slash(path));

	if optional_slash && path != "/" {
		path.push_str("(/)");
	}
	path
}

/// Resolve the route name: the descriptor name, else `route_name`, else the
/// custom name, prefixed by the controller
fn resolve_name(spec: &RouteSpec, scope: &ScopeContext) -> Option<String> {
	let name = match &spec.descriptor {
		PathDescriptor::Name(name) => Some(name.clone()),
		_ => spec
			.options
			.route_name
			.clone()
			.or_else(|| spec.options.name.clone()),
	}?;
	if scope.has_controller() {
		Some(format!("{}_{}", scope.controller_name(), name))
	} else {
		Some(name)
	}
}

/// Normalize a declaration inside a controller scope
pub fn normalize(spec: &RouteSpec, scope: &ScopeContext) -> NormalizedRoute {
	let options = &spec.options;
	let provides = if options.provides.is_empty() {
		scope.provides.clone()
	} else {
		options.provides.clone()
	};
	let mut default_values = scope.default_values.clone();
	for (key, value) in &options.default_values {
		default_values.insert(key.clone(), value.clone());
	}
	let parents = parent::merge_parents(&scope.parents, &options.parents);
	let name = resolve_name(spec, scope);

	let map = options.map.as_deref();
	let absolute_map = map.is_some_and(|map| map.starts_with('/'));

	let mut path = match &spec.descriptor {
		PathDescriptor::Pattern(pattern) => {
			return NormalizedRoute {
				path: pattern.clone(),
				name,
				parents,
				provides,
				default_values,
				is_pattern: true,
			};
		}
		PathDescriptor::Name(name) => match map {
			Some(map) => map.to_string(),
			None if name == "index" => "/".to_string(),
			None => name.clone(),
		},
		PathDescriptor::Path(path) => path.clone(),
		PathDescriptor::Array(segments) => {
			let mut iter = segments.iter();
			let head = iter.next().cloned().unwrap_or_else(|| "/".to_string());
			iter.fold(head, |path, segment| join_path(&path, &format!(":{}", segment)))
		}
	};

	for param in &options.with {
		path = join_path(&path, &format!(":{}", param));
	}

	if (!provides.is_empty() || scope.use_format) && !path.ends_with(FORMAT_SUFFIX) {
		path.push_str(FORMAT_SUFFIX);
	}

	if map.is_none() && scope.has_controller() {
		let stripped = path.strip_prefix("(/)").unwrap_or(&path).replace("/?", "");
		path = if scope.base_map.is_some() {
			stripped
		} else {
			join_path(&scope.controller_path(), &stripped)
		};
	}

	if !absolute_map && !parents.is_empty() {
		path = parent::compose(&path, &parents);
	}

	if !absolute_map && let Some(base_map) = &scope.base_map {
		path = squeeze_slashes(&format!("{}/{}", base_map, path));
	}

	NormalizedRoute {
		path: normalize_template(&path),
		name,
		parents,
		provides,
		default_values,
		is_pattern: false,
	}
}
