//! Before and after filters
//!
//! A filter fires when any of its matchers accepts the request, or when it
//! has no matchers at all. Filters declared with `except` fire for every
//! request their matchers reject.

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use trellis_urls::AttributeMatcher;

use crate::context::RequestContext;
use crate::handler::FilterAction;

/// Errors raised while declaring a filter
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
	#[error("'except' can't be combined with other filter arguments")]
	ExceptWithOtherArguments,
}

static NEXT_FILTER_ID: AtomicUsize = AtomicUsize::new(0);

/// Registration-order identity of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(usize);

impl FilterId {
	fn next() -> Self {
		FilterId(NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
	Before,
	After,
}

/// Request attribute tested by [`FilterMatcher::Attribute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAttribute {
	Agent,
	Host,
	Method,
	Path,
	Header(String),
}

impl RequestAttribute {
	fn read<'a>(&self, ctx: &'a RequestContext) -> Option<&'a str> {
		let request = ctx.request();
		match self {
			RequestAttribute::Agent => Some(request.user_agent()),
			RequestAttribute::Host => request.host(),
			RequestAttribute::Method => Some(request.method.as_str()),
			RequestAttribute::Path => Some(request.path()),
			RequestAttribute::Header(name) => request.header(name.as_str()),
		}
	}
}

/// One test a filter applies to the request
#[derive(Debug, Clone)]
pub enum FilterMatcher {
	/// Route name, bare or prefixed with the filter's controller
	Name(String),
	/// Regex against the request path
	Pattern(Regex),
	/// Exact request path
	Path(String),
	Attribute(RequestAttribute, AttributeMatcher),
}

impl FilterMatcher {
	fn matches(&self, ctx: &RequestContext, scope: Option<&str>) -> bool {
		match self {
			FilterMatcher::Name(name) => {
				let Some(route_name) = ctx.route_name() else {
					return false;
				};
				route_name == name
					|| scope.is_some_and(|scope| {
						route_name
							.strip_prefix(scope)
							.and_then(|rest| rest.strip_prefix('_'))
							== Some(name.as_str())
					})
			}
			FilterMatcher::Pattern(regex) => regex.is_match(ctx.request().path()),
			FilterMatcher::Path(path) => ctx.request().path() == path,
			FilterMatcher::Attribute(attribute, matcher) => attribute
				.read(ctx)
				.is_some_and(|value| matcher.matches(value)),
		}
	}
}

/// Arguments of a filter declaration
///
/// # Examples
///
/// ```
/// use trellis_dispatch::{FilterError, FilterMatcher, FilterOptions};
///
/// assert!(FilterOptions::new().with_name("index").with_path("/about").validate().is_ok());
/// assert_eq!(
///     FilterOptions::new()
///         .with_name("index")
///         .except(FilterMatcher::Name("show".into()))
///         .validate(),
///     Err(FilterError::ExceptWithOtherArguments)
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
	matchers: Vec<FilterMatcher>,
	except: Vec<FilterMatcher>,
}

impl FilterOptions {
	/// No matchers: the filter fires for every request
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_matcher(mut self, matcher: FilterMatcher) -> Self {
		self.matchers.push(matcher);
		self
	}

	pub fn with_name(self, name: impl Into<String>) -> Self {
		self.with_matcher(FilterMatcher::Name(name.into()))
	}

	pub fn with_path(self, path: impl Into<String>) -> Self {
		self.with_matcher(FilterMatcher::Path(path.into()))
	}

	pub fn with_pattern(self, pattern: Regex) -> Self {
		self.with_matcher(FilterMatcher::Pattern(pattern))
	}

	pub fn with_attribute(self, attribute: RequestAttribute, matcher: AttributeMatcher) -> Self {
		self.with_matcher(FilterMatcher::Attribute(attribute, matcher))
	}

	/// Fire for every request the matcher rejects
	pub fn except(mut self, matcher: FilterMatcher) -> Self {
		self.except.push(matcher);
		self
	}

	pub fn validate(&self) -> Result<(), FilterError> {
		if !self.except.is_empty() && !self.matchers.is_empty() {
			return Err(FilterError::ExceptWithOtherArguments);
		}
		Ok(())
	}
}

/// A declared filter
pub struct Filter {
	id: FilterId,
	mode: FilterMode,
	scope: Option<String>,
	matchers: Vec<FilterMatcher>,
	negate: bool,
	action: FilterAction,
}

impl fmt::Debug for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Filter")
			.field("id", &self.id)
			.field("mode", &self.mode)
			.field("scope", &self.scope)
			.field("matchers", &self.matchers)
			.field("negate", &self.negate)
			.finish_non_exhaustive()
	}
}

impl Filter {
	/// Build a filter, rejecting `except` mixed with other matchers
	pub fn new(
		mode: FilterMode,
		scope: Option<String>,
		options: FilterOptions,
		action: FilterAction,
	) -> Result<Self, FilterError> {
		options.validate()?;
		let negate = !options.except.is_empty();
		let matchers = if negate {
			options.except
		} else {
			options.matchers
		};
		Ok(Self {
			id: FilterId::next(),
			mode,
			scope,
			matchers,
			negate,
			action,
		})
	}

	pub fn id(&self) -> FilterId {
		self.id
	}

	pub fn mode(&self) -> FilterMode {
		self.mode
	}

	/// Controller the filter was declared in, names joined by `_`
	pub fn scope(&self) -> Option<&str> {
		self.scope.as_deref()
	}

	/// Whether the filter fires for the request in `ctx`
	pub fn applies(&self, ctx: &RequestContext) -> bool {
		if self.matchers.is_empty() {
			return true;
		}
		let matched = self
			.matchers
			.iter()
			.any(|matcher| matcher.matches(ctx, self.scope.as_deref()));
		matched ^ self.negate
	}

	pub(crate) fn action(&self) -> &FilterAction {
		&self.action
	}
}

/// Filters attached to every route of one controller scope
#[derive(Debug, Clone, Default)]
pub struct ScopeFilters {
	pub before: Vec<Arc<Filter>>,
	pub after: Vec<Arc<Filter>>,
}

impl ScopeFilters {
	pub fn push(&mut self, filter: Arc<Filter>) {
		match filter.mode() {
			FilterMode::Before => self.before.push(filter),
			FilterMode::After => self.after.push(filter),
		}
	}

	pub fn ids(&self) -> impl Iterator<Item = FilterId> + '_ {
		self.before.iter().chain(&self.after).map(|filter| filter.id())
	}

	pub fn list(&self, mode: FilterMode) -> &[Arc<Filter>] {
		match mode {
			FilterMode::Before => &self.before,
			FilterMode::After => &self.after,
		}
	}
}
