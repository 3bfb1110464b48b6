//! Application DSL and request dispatch

pub use trellis_dispatch::*;
