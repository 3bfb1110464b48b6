//! # Trellis HTTP
//!
//! The narrow HTTP surface the routing core consumes from the underlying toolkit:
//!
//! - [`Request`]: method, path, query, headers (Accept, User-Agent, Host)
//! - [`Response`]: status, headers, body and the static-file marker
//! - [`negotiation`]: Accept header parsing and the format/mime registry
//!
//! ## Examples
//!
//! ```
//! use trellis_http::{Request, Response};
//! use http::{Method, StatusCode};
//!
//! let request = Request::builder()
//!     .method(Method::GET)
//!     .uri("/users/42?tab=posts")
//!     .header("accept", "text/html")
//!     .build()
//!     .unwrap();
//! assert_eq!(request.path(), "/users/42");
//! assert_eq!(request.query(), Some("tab=posts"));
//!
//! let response = Response::ok().with_body("hello");
//! assert_eq!(response.status, StatusCode::OK);
//! ```

pub mod negotiation;
mod request;
mod response;

pub use negotiation::{AcceptHeader, Format, MediaType, MimeRegistry};
pub use request::{Request, RequestBuilder};
pub use response::Response;

use thiserror::Error;

/// Errors raised while building requests
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HttpError {
	/// The request target could not be parsed
	#[error("Invalid URI: {0}")]
	InvalidUri(#[from] http::uri::InvalidUri),

	/// A header name was not a valid token
	#[error("Invalid header name: {0}")]
	InvalidHeaderName(#[from] http::header::InvalidHeaderName),

	/// A header value contained forbidden bytes
	#[error("Invalid header value: {0}")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, HttpError>;
