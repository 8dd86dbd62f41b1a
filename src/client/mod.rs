//! Client Module
//!
//! HTTP client and outbound header handling.

pub mod headers;
pub mod http;

pub use http::HttpClient;
