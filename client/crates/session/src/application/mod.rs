//! Application Layer
//!
//! Token store, authenticated client, session context, and the typed
//! LMS endpoint helpers.

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod token_store;

// Re-exports
pub use api::LmsApi;
pub use client::AuthClient;
pub use config::{ClientConfig, StorageKeys};
pub use context::{SessionContext, SessionTasks};
pub use token_store::TokenStore;
