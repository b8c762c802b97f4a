//! BFF (Backend-for-Frontend) Module
//!
//! Clean Architecture structure:
//! - `domain/` - Backend request/response model, gateway trait, token discovery
//! - `application/` - Use cases (login, refresh, logout, forward, test user)
//! - `infra/` - reqwest implementation of the backend gateway
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Routes
//! - `POST /api/auth/login` - exchange credentials, set the refresh cookie
//! - `POST /api/auth/refresh` - mint a new access token from the cookie
//! - `POST /api/auth/logout` - clear the cookie
//! - `ANY  /api/proxy/{*path}` - forward to the backend REST API
//! - `GET  /api/setup/create-test-user` - development helper, off by default
//!
//! ## Security Model
//! - The refresh token only ever travels in an HTTP-only cookie
//! - Browser code only sees short-lived access tokens

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::BffConfig;
pub use error::{BffError, BffResult};
pub use infra::http::ReqwestGateway;
pub use presentation::router::{bff_router, bff_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::message::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

#[cfg(test)]
mod tests;
