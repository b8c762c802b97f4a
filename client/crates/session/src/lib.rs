//! Session Module
//!
//! Client side of the LMS web tier: keeps the access token, attaches it
//! to every API call, refreshes it through the BFF when the backend
//! answers 401, and tracks who is signed in.
//!
//! Clean Architecture structure:
//! - `domain/` - Session state, user profile, route guard, storage and transport traits
//! - `application/` - Token store, authenticated client, session context, API helpers
//! - `infra/` - In-memory/file storage, reqwest transport, cross-tab sync bus
//!
//! ## Flow
//! - `RouteGuard` reads the `SessionContext` snapshot
//! - `SessionContext` drives bootstrap, login, logout and periodic refresh
//!   through `AuthClient` and `TokenStore`
//! - `AuthClient` reads `TokenStore` on every request and writes it after a
//!   refresh

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::api::LmsApi;
pub use application::client::AuthClient;
pub use application::config::ClientConfig;
pub use application::context::{SessionContext, SessionTasks};
pub use application::token_store::TokenStore;
pub use domain::guard::{GuardDecision, RouteGuard};
pub use domain::profile::UserProfile;
pub use domain::session::{Session, SessionStatus};
pub use error::{ClientError, ClientResult, RefreshFailure, StorageError, TransportError};
pub use infra::storage::{FileStorage, MemoryStorage};
pub use infra::sync::{SyncBus, SyncKind, SyncSignal, TabId};
pub use infra::transport::ReqwestTransport;
