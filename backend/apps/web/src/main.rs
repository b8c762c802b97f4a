//! Web Server Entry Point
//!
//! Serves the BFF routes the browser client talks to.
//! Uses `anyhow` for startup errors, but handler errors
//! go through `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;

use axum::{
    Router, http,
    http::{Method, header},
};
use bff::{BffConfig, ReqwestGateway, bff_router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// `BffConfig` defaults overridden from the environment.
///
/// Setup routes stay off unless `LMS_ENABLE_SETUP_ROUTES` is set.
fn load_config() -> BffConfig {
    let mut config = BffConfig {
        backend_base_url: env::var("LMS_API_BASE_URL").ok().filter(|v| !v.trim().is_empty()),
        enable_setup_routes: env_flag("LMS_ENABLE_SETUP_ROUTES").unwrap_or(false),
        ..BffConfig::default()
    };
    if let Some(secure) = env_flag("LMS_COOKIE_SECURE") {
        config.refresh_cookie.secure = secure;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web=info,bff=info,session=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config();
    match config.backend_base_url.as_deref() {
        Some(url) => tracing::info!(backend = %url, "Backend configured"),
        // Routes still mount; each call answers with a configuration error
        None => tracing::warn!("LMS_API_BASE_URL is not set"),
    }
    if config.enable_setup_routes {
        tracing::warn!("Setup routes enabled");
    }

    let gateway = ReqwestGateway::new(config.backend_timeout)?;

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .merge(bff_router(gateway, config))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
