//! Domain Layer
//!
//! Session state, user profile, route guard, and the traits the
//! application layer needs from storage and the network.

pub mod guard;
pub mod profile;
pub mod session;
pub mod storage;
pub mod transport;

// Re-exports
pub use storage::KeyValueStorage;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, LocalHttpTransport};
