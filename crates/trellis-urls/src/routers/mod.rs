//! Route declaration, compilation, matching and reversal

pub mod error;
pub mod parent;
pub mod pattern;
pub mod priority;
pub mod reverse;
pub mod route;
pub mod scope;
pub mod table;
pub mod template;

pub use error::RouteError;
pub use parent::ParentResource;
pub use pattern::{Captures, PathMatcher, PathPattern};
pub use priority::Priority;
pub use reverse::{UrlBuilder, ValueCoercion};
pub use route::{AttributeMatcher, CompiledRoute, PathDescriptor, RouteOptions, RouteSpec};
pub use scope::ScopeContext;
pub use table::{Candidate, RouteTable};
pub use template::{FORMAT_SUFFIX, NormalizedRoute, normalize_template};
