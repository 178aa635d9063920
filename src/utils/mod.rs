//! Utilities Module
//!
//! Common utilities used across the crate.

mod http;
pub mod logging;

pub use http::*;
