// SPDX-License-Identifier: BUSL-1.1
//! Hopster stub server: standalone equipment for local development.
//!
//! Point the API at it with `HOPSTER_BASE_URL=http://localhost:8090`.
//! Storage is in-memory (DashMap); everything is lost on restart.

use std::net::SocketAddr;

use brewline_actuator_stub::{router, AppState, StubConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("HOPSTER_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8090);

    let config = StubConfig::from_env();
    tracing::info!(
        container_size = config.container_size,
        bottle_size = config.bottle_size,
        api_key_required = config.api_key.is_some(),
        "stub configured"
    );
    let app = router(AppState::new(config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("brewline-actuator-stub listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
