//! prometheus meters shared between the webhook receiver and the telemetry
//! endpoint

use std::sync::Arc;

use prometheus::{opts, IntCounterVec, Registry};

/// prometheus meters of the bridge
#[derive(Clone)]
pub struct Metrics {
    /// registry the meters live on, gathered by the telemetry endpoint
    registry: Arc<Registry>,
    /// total number of deserialized notifications
    received_notifications: IntCounterVec,
    /// number of notifications that could not be delivered
    forward_failures: IntCounterVec,
}

impl Metrics {
    /// construct prometheus meters on a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let received_notifications = IntCounterVec::new(
            opts!(
                "received_notifications",
                "total number of deserialized alertmanager notifications"
            )
            .namespace("alertmatter")
            .subsystem("webhook_receiver"),
            &["channel"],
        )?;
        registry.register(Box::new(received_notifications.clone()))?;

        let forward_failures = IntCounterVec::new(
            opts!(
                "forward_failures",
                "number of notifications that could not be delivered to mattermost"
            )
            .namespace("alertmatter")
            .subsystem("webhook_receiver"),
            &["channel"],
        )?;
        registry.register(Box::new(forward_failures.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            received_notifications,
            forward_failures,
        })
    }

    /// registry handle for the telemetry endpoint
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// counts received notifications
    pub fn record_received_notification(&self, channel: &str) {
        self.received_notifications
            .with_label_values(&[channel])
            .inc();
    }

    /// counts notifications that could not be forwarded
    pub fn record_forward_failure(&self, channel: &str) {
        self.forward_failures.with_label_values(&[channel]).inc();
    }
}
