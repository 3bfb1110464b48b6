//! Content negotiation primitives
//!
//! Accept header parsing and the format ↔ mime-type registry used by the
//! router's `provides` condition.

pub mod accept;
pub mod media_type;
pub mod mime;

pub use accept::AcceptHeader;
pub use media_type::MediaType;
pub use mime::{Format, MimeRegistry};
