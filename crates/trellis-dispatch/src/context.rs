//! Per-request dispatch state

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use trellis_http::{Format, HttpError, MimeRegistry, Request};
use trellis_urls::{Captures, CompiledRoute};

/// State threaded through filters, conditions and the handler of one request
#[derive(Debug)]
pub struct RequestContext {
	request: Request,
	params: Map<String, Value>,
	route: Option<Arc<CompiledRoute>>,
	content_type: Option<Format>,
	layout: Option<String>,
	response_headers: HeaderMap,
	mime: Arc<MimeRegistry>,
}

impl RequestContext {
	/// Context for `request`, its parameters seeded from the query string
	///
	/// # Examples
	///
	/// ```
	/// use trellis_dispatch::RequestContext;
	/// use trellis_http::Request;
	///
	/// let request = Request::builder().uri("/search?q=rust").build().unwrap();
	/// let ctx = RequestContext::new(request);
	/// assert_eq!(ctx.param_str("q"), Some("rust"));
	/// assert!(ctx.route().is_none());
	/// ```
	pub fn new(request: Request) -> Self {
		Self::with_registry(request, Arc::new(MimeRegistry::new()))
	}

	pub fn with_registry(request: Request, mime: Arc<MimeRegistry>) -> Self {
		let params = request
			.query_pairs()
			.into_iter()
			.map(|(key, value)| (key, Value::String(value)))
			.collect();
		Self {
			request,
			params,
			route: None,
			content_type: None,
			layout: None,
			response_headers: HeaderMap::new(),
			mime,
		}
	}

	pub fn request(&self) -> &Request {
		&self.request
	}

	pub fn params(&self) -> &Map<String, Value> {
		&self.params
	}

	pub fn params_mut(&mut self) -> &mut Map<String, Value> {
		&mut self.params
	}

	pub fn param(&self, name: &str) -> Option<&Value> {
		self.params.get(name)
	}

	/// String value of a parameter
	pub fn param_str(&self, name: &str) -> Option<&str> {
		self.params.get(name).and_then(Value::as_str)
	}

	pub fn set_param(&mut self, name: impl Into<String>, value: Value) {
		self.params.insert(name.into(), value);
	}

	/// Route currently being evaluated
	pub fn route(&self) -> Option<&Arc<CompiledRoute>> {
		self.route.as_ref()
	}

	pub fn route_name(&self) -> Option<&str> {
		self.route.as_ref().and_then(|route| route.name())
	}

	/// Negotiated response format
	pub fn content_type(&self) -> Option<&Format> {
		self.content_type.as_ref()
	}

	/// Set the response format, resolving aliases such as `htm`
	pub fn set_content_type(&mut self, format: impl Into<Format>) {
		self.content_type = Some(self.mime.canonical(&format.into()));
	}

	/// `Content-Type` header value for the negotiated format
	pub fn content_type_header(&self, charset: &str) -> Option<String> {
		let format = self.content_type.as_ref()?;
		let mime = self.mime.mime_type(format)?;
		Some(format!("{};charset={}", mime, charset))
	}

	pub fn layout(&self) -> Option<&str> {
		self.layout.as_deref()
	}

	pub fn set_layout(&mut self, layout: Option<String>) {
		self.layout = layout;
	}

	pub fn mime_registry(&self) -> &MimeRegistry {
		&self.mime
	}

	/// Headers merged into the final response
	pub fn response_headers(&self) -> &HeaderMap {
		&self.response_headers
	}

	pub fn set_response_header(&mut self, name: &str, value: &str) -> Result<(), HttpError> {
		let name = HeaderName::from_bytes(name.as_bytes())?;
		let value = HeaderValue::from_str(value)?;
		self.response_headers.insert(name, value);
		Ok(())
	}
}

/// Per-candidate view of a [`RequestContext`]
///
/// Parameters, layout, current route and negotiated format are saved on
/// entry and restored when the scope is dropped, whichever way evaluation of
/// the candidate ends. [`CandidateScope::keep`] leaves the route and format of
/// the candidate that answered in place.
pub struct CandidateScope<'a> {
	ctx: &'a mut RequestContext,
	params: Map<String, Value>,
	layout: Option<String>,
	route: Option<Arc<CompiledRoute>>,
	content_type: Option<Format>,
}

impl<'a> CandidateScope<'a> {
	pub fn enter(ctx: &'a mut RequestContext, route: Arc<CompiledRoute>) -> Self {
		let params = ctx.params.clone();
		let layout = ctx.layout.clone();
		let content_type = ctx.content_type.clone();
		let previous = ctx.route.replace(route);
		Self {
			ctx,
			params,
			layout,
			route: previous,
			content_type,
		}
	}

	/// End the candidate as the one answering the request
	///
	/// Parameters and layout are restored; the route and negotiated format
	/// stay set for request-level after filters.
	pub fn keep(mut self) {
		self.route = self.ctx.route.clone();
		self.content_type = self.ctx.content_type.clone();
	}

	/// Merge the route captures into the parameters
	///
	/// Regex routes without named groups expose their groups as `captures`.
	/// Default values fill missing parameters and static captures override.
	pub fn merge_captures(&mut self, captures: &Captures) {
		let Some(route) = self.ctx.route.clone() else {
			return;
		};
		for (name, value) in &captures.named {
			self.ctx.params.insert(name.clone(), Value::String(value.clone()));
		}
		if route.is_pattern() && captures.named.is_empty() && !captures.positional.is_empty() {
			let positional = captures
				.positional
				.iter()
				.map(|value| match value {
					Some(value) => Value::String(value.clone()),
					None => Value::Null,
				})
				.collect();
			self.ctx
				.params
				.insert("captures".to_string(), Value::Array(positional));
		}
		for (name, value) in &route.default_values {
			if !self.ctx.params.contains_key(name) {
				self.ctx.params.insert(name.clone(), value.clone());
			}
		}
		for (name, value) in &route.static_captures {
			self.ctx.params.insert(name.clone(), value.clone());
		}
	}
}

impl Deref for CandidateScope<'_> {
	type Target = RequestContext;

	fn deref(&self) -> &RequestContext {
		self.ctx
	}
}

impl DerefMut for CandidateScope<'_> {
	fn deref_mut(&mut self) -> &mut RequestContext {
		self.ctx
	}
}

impl Drop for CandidateScope<'_> {
	fn drop(&mut self) {
		self.ctx.params = std::mem::take(&mut self.params);
		self.ctx.layout = self.layout.take();
		self.ctx.route = self.route.take();
		self.ctx.content_type = self.content_type.take();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use trellis_urls::{PathDescriptor, RouteSpec, ScopeContext};

	fn context(uri: &str) -> RequestContext {
		RequestContext::new(Request::builder().uri(uri).build().unwrap())
	}

	fn route(spec: RouteSpec) -> Arc<CompiledRoute> {
		Arc::new(CompiledRoute::compile(&spec, &ScopeContext::new()).unwrap())
	}

	#[rstest]
	fn test_scope_restores_state() {
		let mut ctx = context("/posts/3?sort=asc");
		ctx.set_layout(Some("application".to_string()));
		let route = route(RouteSpec::get("/posts/:id").with_layout("admin"));
		let captures = route.pattern.captures("/posts/3").unwrap();

		{
			let mut scope = CandidateScope::enter(&mut ctx, Arc::clone(&route));
			scope.merge_captures(&captures);
			scope.set_layout(Some("admin".to_string()));
			assert_eq!(scope.param_str("id"), Some("3"));
			assert_eq!(scope.param_str("sort"), Some("asc"));
			assert!(scope.route().is_some());
		}

		assert_eq!(ctx.param("id"), None);
		assert_eq!(ctx.param_str("sort"), Some("asc"));
		assert_eq!(ctx.layout(), Some("application"));
		assert!(ctx.route().is_none());
	}

	#[rstest]
	fn test_scope_restores_content_type() {
		let mut ctx = context("/feed");
		let route = route(RouteSpec::get("/feed"));
		{
			let mut scope = CandidateScope::enter(&mut ctx, Arc::clone(&route));
			scope.set_content_type("json");
		}
		assert!(ctx.content_type().is_none());
		assert!(ctx.route().is_none());
	}

	#[rstest]
	fn test_keep_leaves_route_and_format() {
		let mut ctx = context("/feed?page=2");
		let route = route(RouteSpec::get("/feed/:id").with_layout("rss"));
		let captures = route.pattern.captures("/feed/7").unwrap();
		let mut scope = CandidateScope::enter(&mut ctx, Arc::clone(&route));
		scope.merge_captures(&captures);
		scope.set_layout(Some("rss".to_string()));
		scope.set_content_type("json");
		scope.keep();

		assert_eq!(ctx.route().map(|r| r.path.as_str()), Some("/feed/:id"));
		assert_eq!(ctx.content_type(), Some(&Format::new("json")));
		assert_eq!(ctx.param("id"), None);
		assert_eq!(ctx.param_str("page"), Some("2"));
		assert_eq!(ctx.layout(), None);
	}

	#[rstest]
	fn test_defaults_and_static_captures() {
		let mut ctx = context("/list?page=4");
		let route = route(
			RouteSpec::get("/list")
				.with_default_value("page", json!(1))
				.with_default_value("per", json!(20))
				.with_static_capture("section", json!("news")),
		);
		let captures = route.pattern.captures("/list").unwrap();
		let mut scope = CandidateScope::enter(&mut ctx, route);
		scope.merge_captures(&captures);

		assert_eq!(scope.param("page"), Some(&json!("4")));
		assert_eq!(scope.param("per"), Some(&json!(20)));
		assert_eq!(scope.param("section"), Some(&json!("news")));
	}

	#[rstest]
	fn test_positional_captures() {
		let mut ctx = context("/archive/2024/05");
		let route = route(RouteSpec::get(PathDescriptor::pattern(r"/archive/(\d+)/(\d+)")));
		let captures = route.pattern.captures("/archive/2024/05").unwrap();
		let mut scope = CandidateScope::enter(&mut ctx, route);
		scope.merge_captures(&captures);

		assert_eq!(scope.param("captures"), Some(&json!(["2024", "05"])));
	}

	#[rstest]
	fn test_content_type_header_applies_alias() {
		let mut ctx = context("/");
		ctx.set_content_type("htm");
		assert_eq!(ctx.content_type(), Some(&Format::html()));
		assert_eq!(
			ctx.content_type_header("utf-8").as_deref(),
			Some("text/html;charset=utf-8")
		);
	}

	#[rstest]
	fn test_invalid_response_header() {
		let mut ctx = context("/");
		assert!(ctx.set_response_header("bad header", "x").is_err());
		assert!(ctx.set_response_header("x-trace", "abc").is_ok());
		assert_eq!(ctx.response_headers().get("x-trace").unwrap(), "abc");
	}
}
