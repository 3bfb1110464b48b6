//! # Trellis URLs
//!
//! Route compilation and lookup:
//!
//! - [`routers::template`]: turns a route declaration and its controller scope
//!   into a canonical path template and a symbolic name
//! - [`routers::parent`]: nested parent-resource prefixes
//! - [`routers::table`]: the priority-deferred [`RouteTable`]
//! - [`routers::reverse`]: URL generation from route names
//!
//! ## Examples
//!
//! ```
//! use trellis_urls::{CompiledRoute, ParentResource, RouteSpec, RouteTable, ScopeContext, UrlBuilder};
//! use http::Method;
//! use serde_json::json;
//!
//! let scope = ScopeContext::new()
//!     .with_controller("product")
//!     .with_parent(ParentResource::new("user"));
//! let spec = RouteSpec::get("show").with_params(["id"]);
//!
//! let table: RouteTable<()> = RouteTable::new();
//! table.add(CompiledRoute::compile(&spec, &scope).unwrap(), ());
//!
//! let url = table
//!     .url(&UrlBuilder::new(), "product_show", &[], json!({"user_id": 5, "id": 10}).as_object().unwrap())
//!     .unwrap();
//! assert_eq!(url, "/user/5/product/show/10");
//! ```

pub mod routers;

pub use routers::{
	AttributeMatcher, Candidate, Captures, CompiledRoute, FORMAT_SUFFIX, NormalizedRoute,
	ParentResource, PathDescriptor, PathMatcher, PathPattern, Priority, RouteError, RouteOptions,
	RouteSpec, RouteTable, ScopeContext, UrlBuilder, ValueCoercion, normalize_template,
};

pub type Result<T> = std::result::Result<T, RouteError>;
