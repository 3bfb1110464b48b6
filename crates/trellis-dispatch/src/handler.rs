//! Handler, condition and filter action signatures

use std::fmt;
use std::sync::Arc;
use trellis_http::Response;
use trellis_urls::Captures;

use crate::context::RequestContext;
use crate::exception::BoxError;

/// Early exit from a handler or filter
///
/// Any `std::error::Error` converts into `Interrupt::Error`, so `?` works in
/// handler bodies.
pub enum Interrupt {
	/// Give up on this route and try the next candidate
	Pass,
	/// Stop processing and answer with this response
	Halt(Response),
	/// Fail the request
	Error(BoxError),
}

impl Interrupt {
	pub fn halt(response: impl Into<Response>) -> Self {
		Interrupt::Halt(response.into())
	}
}

impl fmt::Debug for Interrupt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Interrupt::Pass => f.write_str("Pass"),
			Interrupt::Halt(response) => f.debug_tuple("Halt").field(&response.status).finish(),
			Interrupt::Error(error) => f.debug_tuple("Error").field(error).finish(),
		}
	}
}

impl<E> From<E> for Interrupt
where
	E: std::error::Error + Send + Sync + 'static,
{
	fn from(error: E) -> Self {
		Interrupt::Error(Box::new(error))
	}
}

pub type HandlerResult = Result<Response, Interrupt>;

/// Route handler
pub type Handler = Arc<dyn Fn(&mut RequestContext, &Captures) -> HandlerResult + Send + Sync>;

/// Custom route condition
pub type Condition = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// Body of a before or after filter
pub type FilterAction = Arc<dyn Fn(&mut RequestContext) -> Result<(), Interrupt> + Send + Sync>;

/// Shorthand for `Err(Interrupt::Pass)`
pub fn pass<T>() -> Result<T, Interrupt> {
	Err(Interrupt::Pass)
}

/// Shorthand for `Err(Interrupt::Halt(..))`
pub fn halt<T>(response: impl Into<Response>) -> Result<T, Interrupt> {
	Err(Interrupt::halt(response))
}
