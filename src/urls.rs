//! Route normalization, the route table and URL generation

pub use trellis_urls::*;
