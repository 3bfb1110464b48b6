use crate::HttpError;
use crate::negotiation::AcceptHeader;
use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};

/// HTTP request as seen by the router
///
/// Only the parts the dispatch core needs are modelled: method, target,
/// headers and an opaque body owned by the surrounding toolkit.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	/// Create a request from already parsed parts
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Request;
	/// use http::{HeaderMap, Method, Uri};
	/// use bytes::Bytes;
	///
	/// let request = Request::new(
	///     Method::POST,
	///     Uri::from_static("/posts"),
	///     HeaderMap::new(),
	///     Bytes::from("title=hello"),
	/// );
	/// assert_eq!(request.path(), "/posts");
	/// ```
	pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			headers,
			body,
		}
	}

	/// Start building a request
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Path component of the request target
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Raw query string, if any
	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	/// Decoded query-string pairs in request order
	///
	/// Malformed query strings yield no pairs rather than an error; the
	/// toolkit is responsible for rejecting them upstream.
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Request;
	///
	/// let request = Request::builder().uri("/search?q=rust&page=2").build().unwrap();
	/// assert_eq!(
	///     request.query_pairs(),
	///     vec![("q".to_string(), "rust".to_string()), ("page".to_string(), "2".to_string())]
	/// );
	/// ```
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		self.query()
			.and_then(|query| serde_urlencoded::from_str(query).ok())
			.unwrap_or_default()
	}

	/// Header value as a string, ignoring non-visible-ASCII values
	pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// User-Agent header, empty when absent
	pub fn user_agent(&self) -> &str {
		self.header(header::USER_AGENT).unwrap_or("")
	}

	/// Host name without port, taken from the Host header or the URI authority
	///
	/// # Examples
	///
	/// ```
	/// use trellis_http::Request;
	///
	/// let request = Request::builder()
	///     .uri("/")
	///     .header("host", "admin.example.com:8080")
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.host(), Some("admin.example.com"));
	/// ```
	pub fn host(&self) -> Option<&str> {
		let raw = self.header(header::HOST).or_else(|| self.uri.host())?;
		Some(strip_port(raw))
	}

	/// Parsed Accept header, sorted by quality
	///
	/// Multiple Accept header lines are treated as one comma-separated list.
	pub fn accept(&self) -> AcceptHeader {
		let values: Vec<&str> = self
			.headers
			.get_all(header::ACCEPT)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.collect();
		if values.is_empty() {
			return AcceptHeader::empty();
		}
		AcceptHeader::parse(&values.join(","))
	}

	/// Whether the request is a GET or HEAD
	pub fn is_get_or_head(&self) -> bool {
		self.method == Method::GET || self.method == Method::HEAD
	}
}

fn strip_port(host: &str) -> &str {
	// Bracketed IPv6 literals keep their colons
	if let Some(rest) = host.strip_prefix('[') {
		return rest.split(']').next().unwrap_or(rest);
	}
	host.split(':').next().unwrap_or(host)
}

/// Builder for [`Request`]
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	headers: Vec<(String, String)>,
	body: Bytes,
}

impl RequestBuilder {
	/// Set the request method (defaults to GET)
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	/// Set the request target (defaults to `/`)
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	/// Append a header
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	/// Set the request body
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Validate the parts and build the request
	pub fn build(self) -> Result<Request, HttpError> {
		let uri: Uri = self.uri.as_deref().unwrap_or("/").parse()?;
		let mut headers = HeaderMap::new();
		for (name, value) in self.headers {
			let name = HeaderName::from_bytes(name.as_bytes())?;
			let value = HeaderValue::from_str(&value)?;
			headers.append(name, value);
		}
		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			headers,
			body: self.body,
		})
	}
}
