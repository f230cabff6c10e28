// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoints for metrics scraping and liveness probes.
//!
//! - `GET /metrics` - Prometheus text exposition of [`crate::metrics`]
//! - `GET /healthz` - `ok` while the process is serving

use crate::metrics::gather_metrics;
use anyhow::{Context as _, Result};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Content type of the Prometheus text format
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Router serving `/metrics` and `/healthz`.
pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
}

pub(crate) async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            body,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                e.to_string(),
            )
        }
    }
}

pub(crate) async fn healthz_handler() -> &'static str {
    "ok"
}

/// Serve the metrics and health endpoints until the listener fails.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn serve(addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics server to {addr}"))?;
    info!("Metrics server listening on http://{}", addr);

    axum::serve(listener, router())
        .await
        .context("metrics server failed")
}
