//! BFF Router

use axum::{
    Router,
    routing::{any, get, post},
};
use std::sync::Arc;

use crate::application::config::BffConfig;
use crate::domain::gateway::BackendGateway;
use crate::infra::http::ReqwestGateway;
use crate::presentation::handlers::{self, BffAppState};

/// Create the BFF router with the reqwest gateway
pub fn bff_router(gateway: ReqwestGateway, config: BffConfig) -> Router {
    bff_router_generic(gateway, config)
}

/// Create a generic BFF router for any gateway implementation
///
/// Mounts `/api/auth/*`, `/api/proxy/*` and, when enabled, `/api/setup/*`.
pub fn bff_router_generic<G>(gateway: G, config: BffConfig) -> Router
where
    G: BackendGateway + Send + Sync + 'static,
{
    let enable_setup = config.enable_setup_routes;
    let state = BffAppState {
        gateway: Arc::new(gateway),
        config: Arc::new(config),
    };

    let auth = Router::new()
        .route("/login", post(handlers::login::<G>))
        .route("/refresh", post(handlers::refresh::<G>))
        .route("/logout", post(handlers::logout::<G>));

    let proxy = Router::new().route("/{*path}", any(handlers::proxy::<G>));

    let mut router = Router::new()
        .nest("/api/auth", auth)
        .nest("/api/proxy", proxy);

    if enable_setup {
        router = router.route(
            "/api/setup/create-test-user",
            get(handlers::create_test_user::<G>),
        );
    }

    router.with_state(state)
}
