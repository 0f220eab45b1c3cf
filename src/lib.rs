//! prometheus alertmanager receiver that forwards alert notifications into
//! mattermost channels
//!
//! Features:
//! - routes a notification into the mattermost channel named by the `channel`
//!   query parameter of the webhook url
//! - renders every alert of a notification into its own colored message
//!   attachment
//! - exposes prometheus metrics about received notifications and failed
//!   forwards

pub mod alert;
pub mod log;
pub mod mattermost;
pub mod message;
pub mod metrics;
pub mod renderer;
pub mod settings;
pub mod telemetry_endpoint;
pub mod webhook_receiver;
