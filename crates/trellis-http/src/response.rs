use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use std::path::{Path, PathBuf};

/// HTTP response produced by handlers, filters and the dispatcher
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// File the toolkit should stream instead of `body`
	static_file: Option<PathBuf>,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Response;
	/// use http::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			static_file: None,
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// Create a Response with HTTP 405 Method Not Allowed status
	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	/// Create a Response with HTTP 406 Not Acceptable status
	pub fn not_acceptable() -> Self {
		Self::new(StatusCode::NOT_ACCEPTABLE)
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Response telling the toolkit to serve a file from disk
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Response;
	/// use std::path::Path;
	///
	/// let response = Response::static_file("public/app.css");
	/// assert_eq!(response.static_file_path(), Some(Path::new("public/app.css")));
	/// ```
	pub fn static_file(path: impl Into<PathBuf>) -> Self {
		let mut response = Self::ok();
		response.static_file = Some(path.into());
		response
	}

	/// Path of the static file to stream, if this is a static-file response
	pub fn static_file_path(&self) -> Option<&Path> {
		self.static_file.as_deref()
	}

	/// Set the response body
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Response;
	/// use bytes::Bytes;
	///
	/// let response = Response::ok().with_body("Hello, World!");
	/// assert_eq!(response.body, Bytes::from("Hello, World!"));
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a custom header to the response
	///
	/// Invalid names or values are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Response;
	///
	/// let response = Response::ok().with_header("X-Custom-Header", "custom-value");
	/// assert_eq!(response.header("x-custom-header"), Some("custom-value"));
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Set the Content-Type header
	pub fn with_content_type(self, content_type: &str) -> Self {
		self.with_header(header::CONTENT_TYPE.as_str(), content_type)
	}

	/// Header value as a string
	pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Content-Type header, if set
	pub fn content_type(&self) -> Option<&str> {
		self.header(header::CONTENT_TYPE)
	}

	/// Body decoded as UTF-8 (lossy)
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Copy headers that are not already present on this response
	pub fn merge_headers(&mut self, headers: &HeaderMap) {
		for (name, value) in headers {
			if !self.headers.contains_key(name) {
				self.headers.insert(name.clone(), value.clone());
			}
		}
	}
}

impl From<&'static str> for Response {
	fn from(body: &'static str) -> Self {
		Response::ok().with_body(body)
	}
}

impl From<String> for Response {
	fn from(body: String) -> Self {
		Response::ok().with_body(body)
	}
}

impl From<StatusCode> for Response {
	fn from(status: StatusCode) -> Self {
		Response::new(status)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_invalid_header_is_ignored() {
		let response = Response::ok().with_header("bad header", "value");
		assert!(response.headers.is_empty());
	}

	#[rstest]
	fn test_merge_headers_keeps_existing() {
		let mut response = Response::ok().with_header("x-origin", "handler");
		let mut extra = HeaderMap::new();
		extra.insert("x-origin", HeaderValue::from_static("filter"));
		extra.insert("x-filter", HeaderValue::from_static("yes"));
		response.merge_headers(&extra);
		assert_eq!(response.header("x-origin"), Some("handler"));
		assert_eq!(response.header("x-filter"), Some("yes"));
	}

	#[rstest]
	fn test_from_str_is_ok_with_body() {
		let response = Response::from("hello");
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.body_text(), "hello");
	}
}
