//! Delivers rendered messages to the mattermost incoming webhook.

use std::time::Duration;

use anyhow::{Context, Result};
use http::StatusCode;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use thiserror::Error;
use url::Url;

use crate::message::Message;

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct MattermostSettings {
    /// incoming webhook url messages are posted to
    pub url: Url,
    /// timeout of a single delivery attempt
    #[serde_as(as = "DurationSeconds<f64>")]
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

/// error returned when a message could not be delivered
#[derive(Debug, Error)]
pub enum ForwardError {
    /// the message could not be serialized or the request could not be sent
    #[error("error sending request to mattermost: {0}")]
    Transport(#[from] reqwest::Error),
    /// mattermost answered with a non-2xx status
    #[error("received non-OK response from mattermost: {0}")]
    Status(StatusCode),
}

/// Posts rendered messages to the configured incoming webhook. One pooled
/// http client is reused for all deliveries.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    url: Url,
}

impl Forwarder {
    pub fn new(settings: &MattermostSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("could not construct http client")?;

        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }

    /// Sends `message` to mattermost. Exactly one attempt, no retry.
    pub async fn forward(&self, message: &Message) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str) -> MattermostSettings {
        MattermostSettings {
            url: Url::parse(url).unwrap(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn forwards_message_as_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let forwarder = Forwarder::new(&settings(&server.url())).unwrap();
        forwarder.forward(&Message::default()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reports_destination_status_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(502)
            .create_async()
            .await;

        let forwarder = Forwarder::new(&settings(&server.url())).unwrap();
        let err = forwarder.forward(&Message::default()).await.unwrap_err();

        assert!(matches!(err, ForwardError::Status(StatusCode::BAD_GATEWAY)));
        assert!(err.to_string().contains("502 Bad Gateway"));
    }

    #[test]
    fn request_timeout_defaults_to_ten_seconds() {
        let settings: MattermostSettings = serde_json::from_value(serde_json::json!({
            "url": "https://mattermost.example.com/hooks/xyz"
        }))
        .unwrap();

        assert_eq!(settings.request_timeout, Duration::from_secs(10));
    }
}
