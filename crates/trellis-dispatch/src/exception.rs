//! Dispatch errors and their conversion to responses

use http::header::{ALLOW, HeaderValue};
use http::{Method, StatusCode};
use thiserror::Error;
use trellis_http::Response;
use trellis_urls::RouteError;

use crate::filter::FilterError;

/// Error raised by handler and filter code
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a request produced no response
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
	/// No route matches the path
	#[error("Not Found")]
	NotFound,

	/// The path matches routes for other methods only
	#[error("Method Not Allowed")]
	MethodNotAllowed { allow: Vec<Method> },

	/// A route matched but none of its formats is acceptable
	#[error("Not Acceptable")]
	NotAcceptable,

	/// A handler or filter failed
	#[error("Handler error: {0}")]
	Handler(BoxError),

	#[error(transparent)]
	Route(#[from] RouteError),

	#[error(transparent)]
	Filter(#[from] FilterError),
}

impl DispatchError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			DispatchError::NotFound => StatusCode::NOT_FOUND,
			DispatchError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
			DispatchError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
			DispatchError::Handler(_) | DispatchError::Route(_) | DispatchError::Filter(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	/// Minimal response for this error
	///
	/// # Examples
	///
	/// ```
	/// use http::{Method, StatusCode};
	/// use trellis_dispatch::DispatchError;
	///
	/// let response = DispatchError::MethodNotAllowed { allow: vec![Method::GET, Method::HEAD] }.into_response();
	/// assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
	/// assert_eq!(response.header("allow"), Some("GET, HEAD"));
	/// ```
	pub fn into_response(self) -> Response {
		let response = match &self {
			DispatchError::NotFound => Response::not_found(),
			DispatchError::MethodNotAllowed { allow } => {
				let mut response = Response::method_not_allowed();
				let allow = allow
					.iter()
					.map(Method::as_str)
					.collect::<Vec<_>>()
					.join(", ");
				if let Ok(value) = HeaderValue::from_str(&allow) {
					response.headers.insert(ALLOW, value);
				}
				response
			}
			DispatchError::NotAcceptable => Response::not_acceptable(),
			DispatchError::Handler(error) => {
				tracing::warn!(%error, "request failed");
				Response::internal_server_error()
			}
			DispatchError::Route(_) | DispatchError::Filter(_) => Response::internal_server_error(),
		};
		let reason = response.status.canonical_reason().unwrap_or_default();
		response.with_body(reason)
	}
}
