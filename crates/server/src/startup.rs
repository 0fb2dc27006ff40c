use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, MAX_EXPIRES_AFTER_HOURS};
use service::auth::{hasher::HashMethod, repo::build_user_store, AuthConfig, AuthService};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the store, hasher and token issuer described by `cfg` into the
/// shared handler state. The signing key is read here once.
pub fn build_state(cfg: &AppConfig) -> Result<auth::ServerState, StartupError> {
    let store = build_user_store(&cfg.store)
        .map_err(|e| StartupError::InvalidConfig(format!("store: {e}")))?;
    let hash_method: HashMethod = cfg
        .auth
        .hash_method
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("auth.hash_method: {e}")))?;

    let hours = cfg.auth.jwt_expires_after_hours;
    let lifetime_secs = hours
        .checked_mul(3600)
        .filter(|_| hours <= MAX_EXPIRES_AFTER_HOURS)
        .ok_or_else(|| {
            StartupError::InvalidConfig(format!(
                "auth.jwt_expires_after_hours {hours} exceeds {MAX_EXPIRES_AFTER_HOURS}"
            ))
        })?;

    let auth_cfg = AuthConfig {
        jwt_sign_key: cfg.auth.jwt_sign_key.clone(),
        jwt_expires_after: Some(Duration::from_secs(lifetime_secs)),
        hash_method,
    };
    Ok(auth::ServerState {
        auth: Arc::new(AuthService::new(store, auth_cfg)),
        request_timeout: Duration::from_millis(cfg.server.request_timeout_ms),
    })
}

pub fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let state = build_state(cfg)?;
    Ok(routes::build_router(state, build_cors()))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and serve it until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg)?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, hash_method = %cfg.auth.hash_method, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
