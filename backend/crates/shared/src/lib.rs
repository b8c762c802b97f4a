//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every layer of the web tier agrees on:
//! - The unified error type and its HTTP status classification
//! - The JSON error envelope returned to the browser (`{"error": ...}`)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across the BFF server and the client library.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
