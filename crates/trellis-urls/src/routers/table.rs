//! Priority-deferred route table
//!
//! Routes are collected into one bucket per [`Priority`] while the
//! application is declared. The first lookup (or an explicit
//! [`RouteTable::compile`]) flattens the buckets into the matcher, high
//! priority first, declaration order within a bucket. Routes added after that
//! stay in their bucket and are invisible to the matcher until the table is
//! [`reset`](RouteTable::reset) and rebuilt.

use http::Method;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::RouteError;
use super::pattern::{Captures, PathMatcher};
use super::priority::Priority;
use super::reverse::UrlBuilder;
use super::route::CompiledRoute;

/// A route matching the current request
pub struct Candidate<T> {
	pub route: Arc<CompiledRoute>,
	pub payload: Arc<T>,
	pub captures: Captures,
}

impl<T> Clone for Candidate<T> {
	fn clone(&self) -> Self {
		Self {
			route: Arc::clone(&self.route),
			payload: Arc::clone(&self.payload),
			captures: self.captures.clone(),
		}
	}
}

enum Phase<T> {
	Building,
	Compiled {
		matcher: PathMatcher<T>,
		names: HashMap<String, Arc<CompiledRoute>>,
	},
}

struct TableState<T> {
	buckets: [Vec<(Arc<CompiledRoute>, Arc<T>)>; 3],
	phase: Phase<T>,
}

/// Route table generic over the dispatch payload stored next to each route
pub struct RouteTable<T> {
	state: RwLock<TableState<T>>,
}

impl<T> Default for RouteTable<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> RouteTable<T> {
	pub fn new() -> Self {
		Self {
			state: RwLock::new(TableState {
				buckets: [Vec::new(), Vec::new(), Vec::new()],
				phase: Phase::Building,
			}),
		}
	}

	/// Store a route in its priority bucket
	///
	/// The matcher is not touched; see [`RouteTable::compile`].
	pub fn add(&self, route: CompiledRoute, payload: T) -> Arc<CompiledRoute> {
		let route = Arc::new(route);
		tracing::debug!(
			method = %route.method,
			path = %route.path,
			name = route.name().unwrap_or(""),
			priority = %route.priority,
			"route registered"
		);
		let mut state = self.state.write();
		state.buckets[route.priority.index()].push((Arc::clone(&route), Arc::new(payload)));
		route
	}

	pub fn is_compiled(&self) -> bool {
		matches!(self.state.read().phase, Phase::Compiled { .. })
	}

	/// Flatten the buckets into the matcher and index route names
	///
	/// Does nothing once the table is compiled.
	pub fn compile(&self) {
		if self.is_compiled() {
			return;
		}
		let mut state = self.state.write();
		if matches!(state.phase, Phase::Compiled { .. }) {
			return;
		}

		let mut matcher = PathMatcher::new();
		let mut names: HashMap<String, Arc<CompiledRoute>> = HashMap::new();
		for priority in Priority::ALL {
			for (route, payload) in &state.buckets[priority.index()] {
				matcher.push(Arc::clone(route), Arc::clone(payload));
				if let Some(name) = route.name() {
					if names.contains_key(name) {
						tracing::warn!(name, path = %route.path, "duplicate route name, last one wins for reversal");
					}
					names.insert(name.to_string(), Arc::clone(route));
				}
			}
		}

		tracing::info!(routes = matcher.len(), "route table compiled");
		state.phase = Phase::Compiled { matcher, names };
	}

	/// Drop every route and return to the building phase
	pub fn reset(&self) {
		let mut state = self.state.write();
		for bucket in state.buckets.iter_mut() {
			bucket.clear();
		}
		state.phase = Phase::Building;
	}

	/// Number of declared routes, compiled or not
	pub fn len(&self) -> usize {
		self.state.read().buckets.iter().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Declared routes in matching order
	pub fn routes(&self) -> Vec<Arc<CompiledRoute>> {
		let state = self.state.read();
		state
			.buckets
			.iter()
			.flatten()
			.map(|(route, _)| Arc::clone(route))
			.collect()
	}

	/// Route registered under `name`, compiling the table if needed
	pub fn lookup_by_name(&self, name: &str) -> Option<Arc<CompiledRoute>> {
		self.compile();
		match &self.state.read().phase {
			Phase::Compiled { names, .. } => names.get(name).cloned(),
			Phase::Building => None,
		}
	}

	/// Every route answering `method` on `path`, in matcher order
	pub fn match_candidates(&self, method: &Method, path: &str) -> Vec<Candidate<T>> {
		self.compile();
		match &self.state.read().phase {
			Phase::Compiled { matcher, .. } => matcher.candidates(method, path),
			Phase::Building => Vec::new(),
		}
	}

	/// Methods served on `path`, for the `Allow` header of a 405
	pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
		self.compile();
		match &self.state.read().phase {
			Phase::Compiled { matcher, .. } => matcher.allowed_methods(path),
			Phase::Building => Vec::new(),
		}
	}

	/// Generate the URL of the route named `name`
	pub fn url(
		&self,
		builder: &UrlBuilder,
		name: &str,
		positional: &[Value],
		keyed: &Map<String, Value>,
	) -> Result<String, RouteError> {
		let route = self
			.lookup_by_name(name)
			.ok_or_else(|| RouteError::unrecognized(name, "no route with this name"))?;
		builder.build(&route, positional, keyed)
	}
}
