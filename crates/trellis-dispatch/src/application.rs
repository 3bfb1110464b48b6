//! Route declaration and request dispatch
//!
//! An [`Application`] collects routes and filters while it is declared, then
//! answers requests through `&self` from any number of threads.
//!
//! Candidates for a request are evaluated in table order. Each one goes
//! through its conditions (host, content negotiation, custom conditions),
//! its before filters, the handler and its after filters. A condition that
//! fails, or a `pass` from a filter or handler, moves on to the next
//! candidate; the first response wins. When no candidate answers, the parent
//! application (if any) gets the request, and failing that the request ends
//! with 406, 405 or 404.

use http::Method;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use trellis_conf::Settings;
use trellis_http::{Format, MimeRegistry, Request, Response};
use trellis_urls::{
	Captures, CompiledRoute, ParentResource, PathDescriptor, RouteSpec, RouteTable, ScopeContext,
	UrlBuilder,
};

use crate::context::{CandidateScope, RequestContext};
use crate::exception::DispatchError;
use crate::filter::{Filter, FilterId, FilterMode, FilterOptions, ScopeFilters};
use crate::handler::{Condition, FilterAction, Handler, HandlerResult, Interrupt};
use crate::negotiation::{Negotiation, NegotiationRequest, negotiate};
use crate::static_files::StaticFiles;

/// Dispatch payload stored next to each compiled route
pub struct RouteDefinition {
	handler: Handler,
	conditions: Vec<Condition>,
	/// Filters of the scope the route was declared in
	filters: Arc<RwLock<ScopeFilters>>,
}

impl fmt::Debug for RouteDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("conditions", &self.conditions.len())
			.field("filters", &*self.filters.read())
			.finish_non_exhaustive()
	}
}

/// Options of a controller block
///
/// # Examples
///
/// ```
/// use trellis_dispatch::Controller;
/// use trellis_urls::ParentResource;
///
/// let products = Controller::new("product")
///     .with_parent(ParentResource::new("user"))
///     .with_provides(["html", "json"]);
/// assert_eq!(products.name(), "product");
/// ```
#[derive(Clone)]
pub struct Controller {
	name: String,
	parents: Vec<ParentResource>,
	provides: Vec<Format>,
	use_format: Option<bool>,
	map: Option<String>,
	default_values: Map<String, Value>,
	conditions: Vec<Condition>,
}

impl Controller {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			parents: Vec::new(),
			provides: Vec::new(),
			use_format: None,
			map: None,
			default_values: Map::new(),
			conditions: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn with_parent(mut self, parent: ParentResource) -> Self {
		self.parents.push(parent);
		self
	}

	/// Formats provided by every route of the block
	pub fn with_provides<I, F>(mut self, formats: I) -> Self
	where
		I: IntoIterator<Item = F>,
		F: Into<Format>,
	{
		self.provides = formats.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_use_format(mut self, use_format: bool) -> Self {
		self.use_format = Some(use_format);
		self
	}

	/// Path used instead of the controller name in front of every route
	pub fn with_map(mut self, map: impl Into<String>) -> Self {
		self.map = Some(map.into());
		self
	}

	pub fn with_default_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.default_values.insert(key.into(), value);
		self
	}

	/// Condition checked for every route of the block
	pub fn with_condition<F>(mut self, condition: F) -> Self
	where
		F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
	{
		self.conditions.push(Arc::new(condition));
		self
	}
}

struct ControllerScope {
	context: ScopeContext,
	filters: Arc<RwLock<ScopeFilters>>,
	conditions: Vec<Condition>,
}

/// Bookkeeping shared by the candidates of one request
struct DispatchState {
	/// Global before filters of the dispatching application, until they ran
	global_before: Option<Vec<Arc<Filter>>>,
	not_acceptable: bool,
	/// Filters that never run as route filters
	global_ids: HashSet<FilterId>,
}

enum Step {
	Continue,
	Pass,
	Halt(Response),
}

/// A routing application
pub struct Application {
	table: RouteTable<RouteDefinition>,
	globals: Arc<RwLock<ScopeFilters>>,
	scopes: Vec<ControllerScope>,
	mime: Arc<MimeRegistry>,
	treat_format_as_accept: bool,
	serve_static: bool,
	charset: String,
	static_files: Option<Arc<dyn StaticFiles>>,
	parent: Option<Arc<Application>>,
	url_builder: UrlBuilder,
}

impl Default for Application {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Application {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Application")
			.field("routes", &self.table.len())
			.field("compiled", &self.table.is_compiled())
			.field("serve_static", &self.serve_static)
			.field("has_parent", &self.parent.is_some())
			.finish_non_exhaustive()
	}
}

impl Application {
	pub fn new() -> Self {
		Self::with_settings(&Settings::default())
	}

	/// Application configured from `settings`
	pub fn with_settings(settings: &Settings) -> Self {
		let mut url_builder = UrlBuilder::new().with_uri_root(settings.uri_root.clone());
		if let Some(base_path) = &settings.base_path {
			url_builder = url_builder.with_base_path(base_path.clone());
		}
		Self {
			table: RouteTable::new(),
			globals: Arc::new(RwLock::new(ScopeFilters::default())),
			scopes: Vec::new(),
			mime: Arc::new(settings.mime_registry()),
			treat_format_as_accept: settings.treat_format_as_accept,
			serve_static: settings.serve_static,
			charset: settings.default_charset.clone(),
			static_files: None,
			parent: None,
			url_builder,
		}
	}

	pub fn with_static_files(mut self, files: impl StaticFiles + 'static) -> Self {
		self.static_files = Some(Arc::new(files));
		self
	}

	/// Application asked when none of this one's routes answers
	pub fn with_parent(mut self, parent: Arc<Application>) -> Self {
		self.parent = Some(parent);
		self
	}

	pub fn url_builder(&self) -> &UrlBuilder {
		&self.url_builder
	}

	pub fn table(&self) -> &RouteTable<RouteDefinition> {
		&self.table
	}

	/// Declare routes and filters inside a controller block
	///
	/// A nested block starts from a copy of the enclosing block's filters;
	/// filters declared inside it don't leak out.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_dispatch::{Application, Controller};
	/// use trellis_http::{Request, Response};
	///
	/// let mut app = Application::new();
	/// app.controller(Controller::new("product"), |app| {
	///     app.get("list", |_, _| Ok(Response::from("all products")))?;
	///     Ok(())
	/// })
	/// .unwrap();
	///
	/// let response = app.call(Request::builder().uri("/product/list").build().unwrap());
	/// assert_eq!(response.body_text(), "all products");
	/// ```
	pub fn controller<F>(&mut self, controller: Controller, body: F) -> Result<(), DispatchError>
	where
		F: FnOnce(&mut Self) -> Result<(), DispatchError>,
	{
		let scope = self.enter_controller(controller);
		self.scopes.push(scope);
		let result = body(self);
		self.scopes.pop();
		result
	}

	fn enter_controller(&self, controller: Controller) -> ControllerScope {
		let (mut context, filters, mut conditions) = match self.scopes.last() {
			Some(outer) => (
				outer.context.clone(),
				outer.filters.read().clone(),
				outer.conditions.clone(),
			),
			None => (ScopeContext::new(), ScopeFilters::default(), Vec::new()),
		};
		context = context.with_controller(controller.name);
		for parent in controller.parents {
			context = context.with_parent(parent);
		}
		if !controller.provides.is_empty() {
			context.provides = controller.provides;
		}
		if let Some(use_format) = controller.use_format {
			context.use_format = use_format;
		}
		if let Some(map) = controller.map {
			context.base_map = Some(map);
		}
		context.default_values.extend(controller.default_values);
		conditions.extend(controller.conditions);
		ControllerScope {
			context,
			filters: Arc::new(RwLock::new(filters)),
			conditions,
		}
	}

	fn current_context(&self) -> ScopeContext {
		self.scopes
			.last()
			.map(|scope| scope.context.clone())
			.unwrap_or_default()
	}

	fn current_filters(&self) -> Arc<RwLock<ScopeFilters>> {
		self.scopes
			.last()
			.map(|scope| Arc::clone(&scope.filters))
			.unwrap_or_else(|| Arc::clone(&self.globals))
	}

	/// Declare a route handled by `handler`
	pub fn route<H>(&mut self, spec: RouteSpec, handler: H) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		self.route_with_conditions(spec, Vec::new(), handler)
	}

	/// Declare a route that only answers when every condition holds
	pub fn route_with_conditions<H>(
		&mut self,
		spec: RouteSpec,
		conditions: Vec<Condition>,
		handler: H,
	) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		let context = self.current_context();
		let route = CompiledRoute::compile(&spec, &context)?;
		let mut all_conditions = self
			.scopes
			.last()
			.map(|scope| scope.conditions.clone())
			.unwrap_or_default();
		all_conditions.extend(conditions);
		let definition = RouteDefinition {
			handler: Arc::new(handler),
			conditions: all_conditions,
			filters: self.current_filters(),
		};
		Ok(self.table.add(route, definition))
	}

	pub fn get<H>(
		&mut self,
		descriptor: impl Into<PathDescriptor>,
		handler: H,
	) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		self.route(RouteSpec::get(descriptor), handler)
	}

	pub fn post<H>(
		&mut self,
		descriptor: impl Into<PathDescriptor>,
		handler: H,
	) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		self.route(RouteSpec::post(descriptor), handler)
	}

	pub fn put<H>(
		&mut self,
		descriptor: impl Into<PathDescriptor>,
		handler: H,
	) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		self.route(RouteSpec::put(descriptor), handler)
	}

	pub fn patch<H>(
		&mut self,
		descriptor: impl Into<PathDescriptor>,
		handler: H,
	) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		self.route(RouteSpec::patch(descriptor), handler)
	}

	pub fn delete<H>(
		&mut self,
		descriptor: impl Into<PathDescriptor>,
		handler: H,
	) -> Result<Arc<CompiledRoute>, DispatchError>
	where
		H: Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync + 'static,
	{
		self.route(RouteSpec::delete(descriptor), handler)
	}

	/// Declare a before filter
	///
	/// Outside a controller block the filter runs once for every request.
	/// Inside one it runs for the routes of that block.
	pub fn before<F>(&mut self, options: FilterOptions, action: F) -> Result<FilterId, DispatchError>
	where
		F: Fn(&mut RequestContext) -> Result<(), Interrupt> + Send + Sync + 'static,
	{
		self.add_filter(FilterMode::Before, options, Arc::new(action))
	}

	/// Declare an after filter
	pub fn after<F>(&mut self, options: FilterOptions, action: F) -> Result<FilterId, DispatchError>
	where
		F: Fn(&mut RequestContext) -> Result<(), Interrupt> + Send + Sync + 'static,
	{
		self.add_filter(FilterMode::After, options, Arc::new(action))
	}

	fn add_filter(
		&mut self,
		mode: FilterMode,
		options: FilterOptions,
		action: FilterAction,
	) -> Result<FilterId, DispatchError> {
		let scope = self
			.scopes
			.last()
			.map(|scope| scope.context.controller_name());
		let filter = Arc::new(Filter::new(mode, scope, options, action)?);
		let id = filter.id();
		tracing::debug!(?mode, scope = filter.scope().unwrap_or(""), "filter registered");
		self.current_filters().write().push(filter);
		Ok(id)
	}

	/// Build the matcher now instead of on the first request
	pub fn compile(&self) {
		self.table.compile();
	}

	/// Forget every route; the next declarations start a fresh table
	pub fn reset(&self) {
		self.table.reset();
	}

	/// URL of the route named `name`, asking the parent application for
	/// names this one doesn't know
	///
	/// # Examples
	///
	/// ```
	/// use serde_json::{Map, json};
	/// use trellis_dispatch::{Application, Controller};
	/// use trellis_http::Response;
	/// use trellis_urls::{ParentResource, RouteSpec};
	///
	/// let mut app = Application::new();
	/// app.controller(Controller::new("product").with_parent(ParentResource::new("user")), |app| {
	///     app.route(RouteSpec::get("show").with_params(["id"]), |_, _| Ok(Response::ok()))?;
	///     Ok(())
	/// })
	/// .unwrap();
	///
	/// let mut keyed = Map::new();
	/// keyed.insert("user_id".into(), json!(5));
	/// keyed.insert("id".into(), json!(10));
	/// assert_eq!(app.url("product_show", &[], &keyed).unwrap(), "/user/5/product/show/10");
	/// assert!(app.url("nope", &[], &keyed).is_err());
	/// ```
	pub fn url(
		&self,
		name: &str,
		positional: &[Value],
		keyed: &Map<String, Value>,
	) -> Result<String, DispatchError> {
		if self.table.lookup_by_name(name).is_none()
			&& let Some(parent) = &self.parent
		{
			return parent.url(name, positional, keyed);
		}
		Ok(self.table.url(&self.url_builder, name, positional, keyed)?)
	}

	/// Answer `request`, converting routing failures into error responses
	pub fn call(&self, request: Request) -> Response {
		self.dispatch(request)
			.unwrap_or_else(DispatchError::into_response)
	}

	/// Answer `request`
	pub fn dispatch(&self, request: Request) -> Result<Response, DispatchError> {
		if let Some(response) = self.static_response(&request) {
			return Ok(response);
		}
		let is_head = request.method == Method::HEAD;
		let mut ctx = RequestContext::with_registry(request, Arc::clone(&self.mime));
		let mut state = DispatchState {
			global_before: Some(self.globals.read().before.clone()),
			not_acceptable: false,
			global_ids: self.chain_global_ids(),
		};

		let mut outcome = match self.route_request(&mut ctx, &mut state) {
			Ok(Some(response)) => Ok(response),
			Ok(None) => self.unrouted(&mut ctx, &mut state),
			Err(error) => Err(error),
		};

		let after = self.globals.read().after.clone();
		match run_filters(&after, &HashSet::new(), &mut ctx) {
			Ok(Step::Halt(response)) => outcome = Ok(response),
			Ok(_) => {}
			Err(error) => {
				if outcome.is_ok() {
					outcome = Err(error);
				}
			}
		}

		outcome.map(|mut response| {
			response.merge_headers(ctx.response_headers());
			if is_head {
				response = response.with_body("");
			}
			response
		})
	}

	fn static_response(&self, request: &Request) -> Option<Response> {
		if !self.serve_static || !request.is_get_or_head() {
			return None;
		}
		let file = self.static_files.as_ref()?.lookup(request.path())?;
		tracing::debug!(path = request.path(), "served static file");
		Some(Response::static_file(file))
	}

	fn chain_global_ids(&self) -> HashSet<FilterId> {
		let mut ids: HashSet<FilterId> = self.globals.read().ids().collect();
		if let Some(parent) = &self.parent {
			ids.extend(parent.chain_global_ids());
		}
		ids
	}

	/// This application's candidates, then the parent's
	fn route_request(
		&self,
		ctx: &mut RequestContext,
		state: &mut DispatchState,
	) -> Result<Option<Response>, DispatchError> {
		if let Some(response) = self.try_candidates(ctx, state)? {
			return Ok(Some(response));
		}
		match &self.parent {
			Some(parent) => {
				tracing::debug!(path = ctx.request().path(), "falling through to parent application");
				parent.route_request(ctx, state)
			}
			None => Ok(None),
		}
	}

	fn try_candidates(
		&self,
		ctx: &mut RequestContext,
		state: &mut DispatchState,
	) -> Result<Option<Response>, DispatchError> {
		let method = ctx.request().method.clone();
		let path = ctx.request().path().to_string();

		for candidate in self.table.match_candidates(&method, &path) {
			let route = &candidate.route;
			let definition = &candidate.payload;

			if let Some(agent) = &route.user_agent
				&& !agent.matches(ctx.request().user_agent())
			{
				tracing::debug!(route = %route.path, "candidate passed: user agent");
				continue;
			}

			let mut scope = CandidateScope::enter(ctx, Arc::clone(route));
			scope.merge_captures(&candidate.captures);

			if let Some(before) = state.global_before.take() {
				match run_filters(&before, &HashSet::new(), &mut scope)? {
					Step::Continue => {}
					Step::Pass => continue,
					Step::Halt(response) => {
						scope.keep();
						return Ok(Some(response));
					}
				}
			}

			if !self.conditions_hold(&mut scope, route, definition, state) {
				continue;
			}

			let (before, after) = {
				let filters = definition.filters.read();
				(filters.before.clone(), filters.after.clone())
			};
			let mut response = match run_filters(&before, &state.global_ids, &mut scope)? {
				Step::Pass => continue,
				Step::Halt(response) => response,
				Step::Continue => {
					if let Some(layout) = &route.layout {
						scope.set_layout(Some(layout.clone()));
					}
					match (definition.handler)(&mut *scope, &candidate.captures) {
						Ok(response) => response,
						Err(Interrupt::Pass) => {
							tracing::debug!(route = %route.path, "candidate passed: handler");
							continue;
						}
						Err(Interrupt::Halt(response)) => response,
						Err(Interrupt::Error(error)) => return Err(DispatchError::Handler(error)),
					}
				}
			};

			if let Step::Halt(halted) = run_filters(&after, &state.global_ids, &mut scope)? {
				response = halted;
			}

			if response.content_type().is_none() && response.static_file_path().is_none() {
				let format = scope.content_type().cloned().unwrap_or_else(Format::html);
				if let Some(mime) = scope.mime_registry().mime_type(&format) {
					response = response.with_content_type(&format!("{};charset={}", mime, self.charset));
				}
			}
			tracing::debug!(route = %route.path, status = %response.status, "request routed");
			scope.keep();
			return Ok(Some(response));
		}
		Ok(None)
	}

	/// Host, content negotiation and custom conditions of one candidate
	fn conditions_hold(
		&self,
		scope: &mut CandidateScope<'_>,
		route: &CompiledRoute,
		definition: &RouteDefinition,
		state: &mut DispatchState,
	) -> bool {
		if let Some(host) = &route.host
			&& !scope.request().host().is_some_and(|value| host.matches(value))
		{
			tracing::debug!(route = %route.path, "candidate passed: host");
			return false;
		}

		if !route.provides.is_empty() {
			let accept = scope.request().accept();
			let url_format = scope.param_str("format").map(Format::new);
			let outcome = negotiate(
				&NegotiationRequest {
					provides: &route.provides,
					accept: &accept,
					url_format: url_format.as_ref(),
					treat_format_as_accept: self.treat_format_as_accept,
				},
				scope.mime_registry(),
			);
			match outcome {
				Negotiation::Accepted(format) => scope.set_content_type(format),
				Negotiation::Unmatched => {
					tracing::debug!(route = %route.path, "candidate passed: format");
					return false;
				}
				Negotiation::NotAcceptable => {
					tracing::debug!(route = %route.path, "candidate passed: not acceptable");
					state.not_acceptable = true;
					return false;
				}
			}
		}

		if !definition.conditions.iter().all(|condition| condition(&**scope)) {
			tracing::debug!(route = %route.path, "candidate passed: condition");
			return false;
		}
		true
	}

	/// No candidate answered
	fn unrouted(
		&self,
		ctx: &mut RequestContext,
		state: &mut DispatchState,
	) -> Result<Response, DispatchError> {
		if let Some(before) = state.global_before.take()
			&& let Step::Halt(response) = run_filters(&before, &HashSet::new(), ctx)?
		{
			return Ok(response);
		}
		if state.not_acceptable {
			return Err(DispatchError::NotAcceptable);
		}
		let method = &ctx.request().method;
		let allow = self.allowed_methods(ctx.request().path());
		if !allow.is_empty() && !allow.contains(method) {
			return Err(DispatchError::MethodNotAllowed { allow });
		}
		Err(DispatchError::NotFound)
	}

	/// Methods served on `path` by this application and its parents
	pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
		let mut allow = self.table.allowed_methods(path);
		if let Some(parent) = &self.parent {
			for method in parent.allowed_methods(path) {
				if !allow.contains(&method) {
					allow.push(method);
				}
			}
		}
		allow
	}
}

/// Run the filters that apply, skipping `excluded` ones
fn run_filters(
	filters: &[Arc<Filter>],
	excluded: &HashSet<FilterId>,
	ctx: &mut RequestContext,
) -> Result<Step, DispatchError> {
	for filter in filters {
		if excluded.contains(&filter.id()) || !filter.applies(ctx) {
			continue;
		}
		tracing::debug!(mode = ?filter.mode(), scope = filter.scope().unwrap_or(""), "filter fired");
		match (filter.action())(ctx) {
			Ok(()) => {}
			Err(Interrupt::Pass) => return Ok(Step::Pass),
			Err(Interrupt::Halt(response)) => return Ok(Step::Halt(response)),
			Err(Interrupt::Error(error)) => return Err(DispatchError::Handler(error)),
		}
	}
	Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handler::halt;
	use http::StatusCode;
	use rstest::rstest;

	fn request(method: Method, uri: &str) -> Request {
		Request::builder().method(method).uri(uri).build().unwrap()
	}

	#[rstest]
	fn test_nested_controller_inherits_scope() {
		let mut app = Application::new();
		app.controller(Controller::new("admin").with_provides(["json"]), |app| {
			app.controller(Controller::new("user"), |app| {
				app.get("list", |_, _| Ok(Response::from("users")))?;
				Ok(())
			})
		})
		.unwrap();

		let route = app.table().lookup_by_name("admin_user_list").unwrap();
		assert_eq!(route.path, "/admin/user/list(.:format)");
		assert_eq!(route.provides, vec![Format::new("json")]);
	}

	#[rstest]
	fn test_nested_filters_do_not_leak_out() {
		let mut app = Application::new();
		app.controller(Controller::new("outer"), |app| {
			app.before(FilterOptions::new(), |ctx| {
				ctx.set_response_header("x-outer", "1")?;
				Ok(())
			})?;
			app.controller(Controller::new("inner"), |app| {
				app.before(FilterOptions::new(), |ctx| {
					ctx.set_response_header("x-inner", "1")?;
					Ok(())
				})?;
				app.get("deep", |_, _| Ok(Response::ok()))?;
				Ok(())
			})?;
			app.get("shallow", |_, _| Ok(Response::ok()))?;
			Ok(())
		})
		.unwrap();

		let deep = app.call(request(Method::GET, "/outer/inner/deep"));
		assert_eq!(deep.header("x-outer"), Some("1"));
		assert_eq!(deep.header("x-inner"), Some("1"));

		let shallow = app.call(request(Method::GET, "/outer/shallow"));
		assert_eq!(shallow.header("x-outer"), Some("1"));
		assert_eq!(shallow.header("x-inner"), None);
	}

	#[rstest]
	fn test_scope_filter_reaches_earlier_routes() {
		let mut app = Application::new();
		app.controller(Controller::new("post"), |app| {
			app.get("index", |_, _| Ok(Response::ok()))?;
			app.before(FilterOptions::new(), |_| halt(StatusCode::FORBIDDEN))?;
			Ok(())
		})
		.unwrap();

		let response = app.call(request(Method::GET, "/post/index"));
		assert_eq!(response.status, StatusCode::FORBIDDEN);
	}

	#[rstest]
	fn test_controller_condition_applies_to_routes() {
		let mut app = Application::new();
		let beta = Controller::new("beta")
			.with_condition(|ctx| ctx.request().header("x-beta").is_some());
		app.controller(beta, |app| {
			app.get("feature", |_, _| Ok(Response::from("beta")))?;
			Ok(())
		})
		.unwrap();

		let denied = app.call(request(Method::GET, "/beta/feature"));
		assert_eq!(denied.status, StatusCode::NOT_FOUND);

		let allowed = app.call(
			Request::builder()
				.uri("/beta/feature")
				.header("x-beta", "yes")
				.build()
				.unwrap(),
		);
		assert_eq!(allowed.body_text(), "beta");
	}

	#[rstest]
	fn test_default_content_type() {
		let mut app = Application::new();
		app.get("/", |_, _| Ok(Response::from("home"))).unwrap();
		let response = app.call(request(Method::GET, "/"));
		assert_eq!(response.content_type(), Some("text/html;charset=utf-8"));
	}

	#[rstest]
	fn test_head_uses_get_route_without_body() {
		let mut app = Application::new();
		app.get("/ping", |_, _| Ok(Response::from("pong"))).unwrap();
		let response = app.call(request(Method::HEAD, "/ping"));
		assert_eq!(response.status, StatusCode::OK);
		assert!(response.body.is_empty());
	}
}
