//! Backend Gateway Trait
//!
//! Interface for reaching the backend API. Implementation is in the
//! infrastructure layer; tests substitute scripted fakes.

use crate::domain::message::{BackendError, BackendRequest, BackendResponse};

/// Sends one buffered request to the backend and buffers the answer.
///
/// Any HTTP status counts as a response; only transport failures
/// (connect, timeout, broken body) are errors.
#[trait_variant::make(BackendGateway: Send)]
pub trait LocalBackendGateway {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;
}
