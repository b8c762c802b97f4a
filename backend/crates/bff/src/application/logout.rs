//! Logout Use Case
//!
//! Tells the backend about the logout when it can. The cookie is
//! cleared by the handler regardless of what happens here.

use std::sync::Arc;

use platform::forward::join_url;

use crate::application::config::BffConfig;
use crate::domain::gateway::BackendGateway;
use crate::domain::message::BackendRequest;

/// Logout use case
pub struct LogoutUseCase<G>
where
    G: BackendGateway,
{
    gateway: Arc<G>,
    config: Arc<BffConfig>,
}

impl<G> LogoutUseCase<G>
where
    G: BackendGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<BffConfig>) -> Self {
        Self { gateway, config }
    }

    /// Best-effort backend logout; never fails
    pub async fn execute(&self) {
        let base = match self.config.backend_base() {
            Ok(base) => base,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping backend logout");
                return;
            }
        };

        let url = join_url(&base, &self.config.logout_endpoint);
        match self.gateway.send(BackendRequest::post_empty(url)).await {
            Ok(response) => {
                tracing::debug!(status = %response.status, "Backend logout answered");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Backend logout failed, ignoring");
            }
        }

        tracing::info!("User logged out");
    }
}
