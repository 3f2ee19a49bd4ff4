// SPDX-License-Identifier: BUSL-1.1
//! # brewline-api - Binary Entry Point
//!
//! Starts the bottling pipeline against the Hopster service configured by
//! `HOPSTER_BASE_URL` / `HOPSTER_API_KEY` and serves the HTTP API. Ctrl-C
//! stops intake, drains the HTTP server and waits for every pipeline loop.

use std::sync::Arc;

use anyhow::Context;
use brewline_actuator::{ActuatorConfig, HttpActuator};
use brewline_bottling::{Pipeline, PipelineConfig, PipelineContext, QueueMode};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "brewline-api", version, about = "Bottling pipeline HTTP service")]
struct Args {
    /// Listen port.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// `split` (one line per beer type) or `global` (one line for all).
    /// Overrides BREWLINE_QUEUE_MODE.
    #[arg(long)]
    queue_mode: Option<QueueMode>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = PipelineConfig::from_env().context("invalid pipeline configuration")?;
    if let Some(mode) = args.queue_mode {
        config.queue_mode = mode;
    }

    let actuator_config = ActuatorConfig::from_env().context("Hopster client not configured")?;
    tracing::info!(config = ?actuator_config, "Hopster client configured");
    let actuator = HttpActuator::new(actuator_config).context("failed to build Hopster client")?;

    let pipeline = Pipeline::start(PipelineContext::new(Arc::new(actuator), config));
    let shutdown = pipeline.shutdown_handle();
    let app = brewline_api::app(brewline_api::AppState::from_pipeline(&pipeline));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "brewline API listening");

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            tracing::info!("shutdown requested");
            shutdown.trigger();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.triggered().await })
        .await
        .context("HTTP server failed")?;

    pipeline.join().await;
    Ok(())
}
