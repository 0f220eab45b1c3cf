//! Here we expose prometheus metrics about alertmatter
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::Extension,
    http::{header::CONTENT_TYPE, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryEndpointSettings {
    pub bind_address: IpAddr,
    pub port: u16,
}

impl TelemetryEndpointSettings {
    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

async fn metrics_handler(Extension(registry): Extension<Arc<Registry>>) -> Response<Body> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    Response::builder()
        .status(200)
        .header(CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buffer))
        .unwrap()
}

pub async fn run_telemetry_endpoint(
    settings: &TelemetryEndpointSettings,
    registry: Arc<Registry>,
) -> Result<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(Extension(registry));

    axum::Server::bind(&settings.to_socket_addr())
        .serve(app.into_make_service())
        .await
        .context("telemetry endpoint crashed")?;

    Ok(())
}
