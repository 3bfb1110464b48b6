//! Request and response primitives
//!
//! # Examples
//!
//! ```rust
//! use trellis::http::{AcceptHeader, Request};
//!
//! let request = Request::builder()
//!     .uri("/list")
//!     .header("accept", "text/html;q=0.5, application/json")
//!     .build()
//!     .unwrap();
//! assert_eq!(request.accept().essences(), vec!["application/json", "text/html"]);
//! assert!(AcceptHeader::empty().is_empty());
//! ```

pub use trellis_http::*;
