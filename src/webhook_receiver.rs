//! Receives alertmanager webhook notifications and forwards them into the
//! mattermost channel named by the `channel` query parameter.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Query},
    http::StatusCode,
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{alert, mattermost::Forwarder, metrics::Metrics, renderer};

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookReceiverSettings {
    pub bind_address: IpAddr,
    pub port: u16,
}

impl WebhookReceiverSettings {
    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

/// state shared by all requests
pub struct State {
    forwarder: Forwarder,
    metrics: Metrics,
}

impl State {
    pub fn new(forwarder: Forwarder, metrics: Metrics) -> Self {
        Self { forwarder, metrics }
    }
}

#[derive(Debug, Deserialize)]
struct ReceiveQuery {
    channel: Option<String>,
}

/// Handles one notification: validate the channel, decode the payload, render
/// it and post it to mattermost. Exactly one delivery attempt per request.
async fn receive_notification(
    Extension(state): Extension<Arc<State>>,
    Query(query): Query<ReceiveQuery>,
    payload: Result<Json<alert::Notification>, JsonRejection>,
) -> Result<StatusCode, (StatusCode, String)> {
    let channel = match query.channel.as_deref() {
        Some(channel) if !channel.is_empty() => channel,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                String::from("channel query parameter is required"),
            ))
        }
    };

    let Json(notification) = payload.map_err(|rejection| {
        tracing::debug!("failed to deserialize notification: {:?}", rejection);
        (StatusCode::BAD_REQUEST, rejection.to_string())
    })?;

    state.metrics.record_received_notification(channel);
    tracing::info!(channel, "received alert notification");

    let message = renderer::render_message(&notification, channel, Utc::now());

    if let Err(err) = state.forwarder.forward(&message).await {
        state.metrics.record_forward_failure(channel);
        tracing::error!(channel, %err, "failed to forward notification to mattermost");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
    }

    Ok(StatusCode::OK)
}

/// The receiver routes. Only POST is routed on `/alert`, the method router
/// answers everything else with 405.
pub fn router(state: Arc<State>) -> Router {
    Router::new()
        .route("/alert", post(receive_notification))
        .layer(Extension(state))
}

pub async fn run_webhook_receiver(
    settings: &WebhookReceiverSettings,
    state: Arc<State>,
) -> Result<()> {
    axum::Server::bind(&settings.to_socket_addr())
        .serve(router(state).into_make_service())
        .await
        .context("webhook receiver crashed")?;

    Ok(())
}
