//! Infrastructure Layer
//!
//! HTTP client implementation of the backend gateway.

pub mod http;

pub use http::ReqwestGateway;
