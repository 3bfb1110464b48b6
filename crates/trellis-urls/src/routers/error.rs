//! Routing errors

use thiserror::Error;

/// Errors raised while compiling, registering or reversing routes
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RouteError {
	#[error("Priority '{0}' not recognized, try high, normal or low")]
	PriorityUnrecognized(String),

	#[error("Invalid path template '{template}': {reason}")]
	InvalidTemplate { template: String, reason: String },

	#[error("Invalid route pattern: {0}")]
	InvalidPattern(#[from] regex::Error),

	#[error("Route '{name}' can't be generated: {reason}")]
	UnrecognizedRoute { name: String, reason: String },

	#[error("Query string encoding failed: {0}")]
	QueryEncoding(#[from] serde_urlencoded::ser::Error),
}

impl RouteError {
	pub(crate) fn unrecognized(name: &str, reason: impl Into<String>) -> Self {
		Self::UnrecognizedRoute {
			name: name.to_string(),
			reason: reason.into(),
		}
	}
}
