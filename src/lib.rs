//! # Trellis
//!
//! Declarative routing and request dispatch for Rust web applications.
//!
//! Routes are declared with a small DSL (controllers, parent resources,
//! provided formats, priorities) and compiled into an ordered table. Requests
//! are dispatched through conditions, content negotiation and scoped
//! before/after filters; named routes generate their URLs back.
//!
//! ## Crates
//!
//! - [`http`] - request and response primitives, Accept parsing, mime table
//! - [`urls`] - path normalization, route table, URL generation
//! - [`dispatch`] - application DSL, filters, negotiation, dispatch
//! - [`conf`] - layered settings (`conf` feature, on by default)
//!
//! ## Quick Example
//!
//! ```rust
//! use trellis::prelude::*;
//! use serde_json::json;
//!
//! let mut app = Application::new();
//! app.controller(
//!     Controller::new("product").with_parent(ParentResource::new("user")),
//!     |app| {
//!         app.route(RouteSpec::get("show").with_params(["id"]), |ctx, _| {
//!             let id = ctx.param_str("id").unwrap_or_default().to_string();
//!             Ok(Response::from(format!("product {}", id)))
//!         })?;
//!         Ok(())
//!     },
//! )
//! .unwrap();
//!
//! let keyed = json!({"user_id": 5, "id": 10}).as_object().cloned().unwrap();
//! let url = app.url("product_show", &[], &keyed).unwrap();
//! assert_eq!(url, "/user/5/product/show/10");
//!
//! let response = app.call(Request::builder().uri(url).build().unwrap());
//! assert_eq!(response.body_text(), "product 10");
//! ```

#[cfg(feature = "conf")]
pub mod conf;
pub mod dispatch;
pub mod http;
pub mod urls;

#[cfg(feature = "conf")]
pub use trellis_conf::{Settings, SettingsBuilder, SettingsError};

pub use trellis_http::{AcceptHeader, Format, MimeRegistry, Request, Response};

pub use trellis_urls::{
	AttributeMatcher, ParentResource, PathDescriptor, Priority, RouteError, RouteSpec, UrlBuilder,
};

pub use trellis_dispatch::{
	Application, Controller, DispatchError, FilterMatcher, FilterOptions, Interrupt,
	RequestContext, StaticDirectory, StaticFiles, halt, pass,
};

pub mod prelude {
	pub use crate::{
		AttributeMatcher, Application, Controller, DispatchError, FilterMatcher, FilterOptions,
		Format, Interrupt, ParentResource, PathDescriptor, Priority, Request, RequestContext,
		Response, RouteError, RouteSpec, halt, pass,
	};

	#[cfg(feature = "conf")]
	pub use crate::Settings;
}
