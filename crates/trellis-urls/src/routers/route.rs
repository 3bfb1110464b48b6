//! Route declarations and compiled routes

use http::Method;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use trellis_http::Format;

use super::parent::ParentResource;
use super::pattern::PathPattern;
use super::priority::Priority;
use super::scope::ScopeContext;
use super::template;
use super::RouteError;

/// What a route was declared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathDescriptor {
	/// Symbolic name such as `index` or `show`; also the route name
	Name(String),
	/// Literal path template
	Path(String),
	/// Path followed by extra `:segment` placeholders
	Array(Vec<String>),
	/// Regular expression matched against the whole path
	Pattern(String),
}

impl PathDescriptor {
	pub fn name(name: impl Into<String>) -> Self {
		Self::Name(name.into())
	}

	pub fn path(path: impl Into<String>) -> Self {
		Self::Path(path.into())
	}

	pub fn pattern(pattern: impl Into<String>) -> Self {
		Self::Pattern(pattern.into())
	}
}

impl From<&str> for PathDescriptor {
	/// Strings starting with `/` or `(` are paths, anything else is a name
	fn from(value: &str) -> Self {
		if value.starts_with('/') || value.starts_with('(') {
			Self::Path(value.to_string())
		} else {
			Self::Name(value.to_string())
		}
	}
}

impl From<String> for PathDescriptor {
	fn from(value: String) -> Self {
		PathDescriptor::from(value.as_str())
	}
}

impl From<Vec<&str>> for PathDescriptor {
	fn from(value: Vec<&str>) -> Self {
		Self::Array(value.into_iter().map(str::to_string).collect())
	}
}

/// Exact string or regex test against a request attribute
#[derive(Debug, Clone)]
pub enum AttributeMatcher {
	Exact(String),
	Pattern(Regex),
}

impl AttributeMatcher {
	pub fn exact(value: impl Into<String>) -> Self {
		Self::Exact(value.into())
	}

	pub fn pattern(pattern: &str) -> Result<Self, RouteError> {
		Ok(Self::Pattern(Regex::new(pattern)?))
	}

	/// # Examples
	///
	/// ```
	/// use trellis_urls::AttributeMatcher;
	///
	/// let matcher = AttributeMatcher::pattern("^admin\\.").unwrap();
	/// assert!(matcher.matches("admin.example.com"));
	/// assert!(!AttributeMatcher::exact("example.com").matches("www.example.com"));
	/// ```
	pub fn matches(&self, value: &str) -> bool {
		match self {
			AttributeMatcher::Exact(expected) => expected == value,
			AttributeMatcher::Pattern(regex) => regex.is_match(value),
		}
	}
}

/// Options attached to a route declaration
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
	/// Explicit path; absolute when it starts with `/`
	pub map: Option<String>,
	pub provides: Vec<Format>,
	pub parents: Vec<Arc<ParentResource>>,
	/// Extra placeholders appended as `/:name`
	pub with: Vec<String>,
	pub cache: bool,
	pub priority: Priority,
	pub host: Option<AttributeMatcher>,
	pub user_agent: Option<AttributeMatcher>,
	pub name: Option<String>,
	pub route_name: Option<String>,
	pub default_values: Map<String, Value>,
	/// Template used to generate URLs for a regex route
	pub generate_with: Option<String>,
	/// Parameters forced on every match
	pub static_captures: Map<String, Value>,
	pub layout: Option<String>,
}

/// A route as declared, before compilation
#[derive(Debug, Clone)]
pub struct RouteSpec {
	pub method: Method,
	pub descriptor: PathDescriptor,
	pub options: RouteOptions,
}

impl RouteSpec {
	pub fn new(method: Method, descriptor: impl Into<PathDescriptor>) -> Self {
		Self {
			method,
			descriptor: descriptor.into(),
			options: RouteOptions::default(),
		}
	}

	pub fn get(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::GET, descriptor)
	}

	pub fn post(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::POST, descriptor)
	}

	pub fn put(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::PUT, descriptor)
	}

	pub fn patch(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::PATCH, descriptor)
	}

	pub fn delete(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::DELETE, descriptor)
	}

	pub fn head(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::HEAD, descriptor)
	}

	pub fn options(descriptor: impl Into<PathDescriptor>) -> Self {
		Self::new(Method::OPTIONS, descriptor)
	}

	pub fn with_map(mut self, map: impl Into<String>) -> Self {
		self.options.map = Some(map.into());
		self
	}

	pub fn with_provides<I, F>(mut self, formats: I) -> Self
	where
		I: IntoIterator<Item = F>,
		F: Into<Format>,
	{
		self.options.provides = formats.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_parent(mut self, parent: ParentResource) -> Self {
		self.options.parents.push(Arc::new(parent));
		self
	}

	pub fn with_params<I, S>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.options.with.extend(params.into_iter().map(Into::into));
		self
	}

	pub fn with_cache(mut self, cache: bool) -> Self {
		self.options.cache = cache;
		self
	}

	pub fn with_priority(mut self, priority: Priority) -> Self {
		self.options.priority = priority;
		self
	}

	pub fn with_host(mut self, host: AttributeMatcher) -> Self {
		self.options.host = Some(host);
		self
	}

	pub fn with_user_agent(mut self, agent: AttributeMatcher) -> Self {
		self.options.user_agent = Some(agent);
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.options.name = Some(name.into());
		self
	}

	pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
		self.options.route_name = Some(name.into());
		self
	}

	pub fn with_default_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.options.default_values.insert(key.into(), value);
		self
	}

	pub fn with_generate_with(mut self, template: impl Into<String>) -> Self {
		self.options.generate_with = Some(template.into());
		self
	}

	pub fn with_static_capture(mut self, key: impl Into<String>, value: Value) -> Self {
		self.options.static_captures.insert(key.into(), value);
		self
	}

	pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
		self.options.layout = Some(layout.into());
		self
	}
}

/// A route ready for matching and reversal
#[derive(Debug, Clone)]
pub struct CompiledRoute {
	pub method: Method,
	/// Canonical template, or the regex source of a pattern route
	pub path: String,
	pub pattern: PathPattern,
	pub generate_with: Option<PathPattern>,
	pub name: Option<String>,
	pub controller: Vec<String>,
	pub parents: Vec<Arc<ParentResource>>,
	pub priority: Priority,
	pub cacheable: bool,
	pub provides: Vec<Format>,
	pub host: Option<AttributeMatcher>,
	pub user_agent: Option<AttributeMatcher>,
	pub default_values: Map<String, Value>,
	pub static_captures: Map<String, Value>,
	pub layout: Option<String>,
}

impl CompiledRoute {
	/// Normalize a declaration inside `scope` and compile its matcher
	///
	/// # Examples
	///
	/// ```
	/// use trellis_urls::{CompiledRoute, RouteSpec, ScopeContext};
	///
	/// let scope = ScopeContext::new().with_controller("product");
	/// let route = CompiledRoute::compile(&RouteSpec::get("list").with_provides(["html", "js"]), &scope).unwrap();
	/// assert_eq!(route.path, "/product/list(.:format)");
	/// assert_eq!(route.name.as_deref(), Some("product_list"));
	/// ```
	pub fn compile(spec: &RouteSpec, scope: &ScopeContext) -> Result<Self, RouteError> {
		let normalized = template::normalize(spec, scope);
		let pattern = if normalized.is_pattern {
			PathPattern::regex(&normalized.path)?
		} else {
			PathPattern::template(&normalized.path)?
		};
		let generate_with = match &spec.options.generate_with {
			Some(template) => Some(PathPattern::template(template)?),
			None => None,
		};
		let options = &spec.options;

		Ok(Self {
			method: spec.method.clone(),
			path: normalized.path,
			pattern,
			generate_with,
			name: normalized.name,
			controller: scope.controllers.clone(),
			parents: normalized.parents,
			priority: options.priority,
			cacheable: options.cache,
			provides: normalized.provides,
			host: options.host.clone(),
			user_agent: options.user_agent.clone(),
			default_values: normalized.default_values,
			static_captures: options.static_captures.clone(),
			layout: options.layout.clone(),
		})
	}

	/// Whether the route serves `method`; `GET` routes serve `HEAD` too
	pub fn answers(&self, method: &Method) -> bool {
		self.method == *method || (self.method == Method::GET && *method == Method::HEAD)
	}

	pub fn is_pattern(&self) -> bool {
		!self.pattern.is_template()
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Controller names joined by `_`
	pub fn controller_name(&self) -> String {
		self.controller.join("_")
	}

	/// Template used for URL generation
	pub fn generator(&self) -> Option<&PathPattern> {
		match &self.generate_with {
			Some(pattern) => Some(pattern),
			None if self.pattern.is_template() => Some(&self.pattern),
			None => None,
		}
	}
}
