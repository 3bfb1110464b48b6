//! # Trellis Dispatch
//!
//! Route declaration DSL and request dispatching for Trellis.
//!
//! ## Overview
//!
//! - Controller blocks that prefix route paths and names
//! - Before and after filters scoped to the application or a controller
//! - Content negotiation against the formats a route provides
//! - Custom route conditions, `pass` and `halt`
//! - Fallthrough to a parent application
//!
//! ## Architecture
//!
//! ```text
//! Request → static files → candidates → conditions → before → handler → after → Response
//!                               ↓ (none answered)
//!                      parent application → 406 / 405 / 404
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use http::StatusCode;
//! use trellis_dispatch::{Application, Controller, FilterOptions, halt};
//! use trellis_http::{Request, Response};
//! use trellis_urls::RouteSpec;
//!
//! let mut app = Application::new();
//! app.get("/", |_, _| Ok(Response::from("home"))).unwrap();
//! app.controller(Controller::new("admin"), |app| {
//!     app.before(FilterOptions::new(), |ctx| {
//!         if ctx.request().header("x-token").is_none() {
//!             return halt(StatusCode::UNAUTHORIZED);
//!         }
//!         Ok(())
//!     })?;
//!     app.route(RouteSpec::get("index"), |_, _| Ok(Response::from("dashboard")))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let home = app.call(Request::builder().uri("/").build().unwrap());
//! assert_eq!(home.body_text(), "home");
//!
//! let admin = app.call(Request::builder().uri("/admin").build().unwrap());
//! assert_eq!(admin.status, StatusCode::UNAUTHORIZED);
//! ```

pub mod application;
pub mod context;
pub mod exception;
pub mod filter;
pub mod handler;
pub mod negotiation;
pub mod static_files;

// Re-exports
pub use application::{Application, Controller, RouteDefinition};
pub use context::{CandidateScope, RequestContext};
pub use exception::{BoxError, DispatchError};
pub use filter::{
	Filter, FilterError, FilterId, FilterMatcher, FilterMode, FilterOptions, RequestAttribute,
	ScopeFilters,
};
pub use handler::{Condition, FilterAction, Handler, HandlerResult, Interrupt, halt, pass};
pub use static_files::{StaticDirectory, StaticFiles};

pub type Result<T> = std::result::Result<T, DispatchError>;
