use std::sync::Arc;

use alertmatter::{
    log,
    mattermost::Forwarder,
    metrics::Metrics,
    settings::Settings,
    telemetry_endpoint,
    webhook_receiver::{self, State},
};
use anyhow::{Context, Result};

/// exit the complete program if one thread panics
fn setup_panic_handler() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
    setup_panic_handler();

    let settings = Settings::load().context("failed to load config and command line arguments")?;

    log::setup_logging(&settings.log).context("could not setup logging")?;

    let metrics = Metrics::new().context("failed to register prometheus metrics")?;
    let registry = metrics.registry();

    let forwarder =
        Forwarder::new(&settings.mattermost).context("failed to construct mattermost forwarder")?;
    let state = Arc::new(State::new(forwarder, metrics));

    tracing::info!(
        webhook_url = %settings.mattermost.url,
        "forwarding alert notifications to mattermost"
    );

    tokio::try_join!(
        webhook_receiver::run_webhook_receiver(&settings.webhook_receiver, state),
        telemetry_endpoint::run_telemetry_endpoint(&settings.telemetry_endpoint, registry),
    )?;

    Ok(())
}
