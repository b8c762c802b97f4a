//! Domain Layer
//!
//! The backend API is an opaque REST service; the domain only knows
//! how to talk to it and how to find tokens in what it says back.

pub mod credentials;
pub mod gateway;
pub mod message;

// Re-exports
pub use gateway::{BackendGateway, LocalBackendGateway};
pub use message::{BackendError, BackendRequest, BackendResponse};
