use anyhow::{Context, Result};
use clap::{App, Arg};
use config::Config;
use serde::Deserialize;
use url::Url;

use crate::{
    log::LogSettings, mattermost::MattermostSettings,
    telemetry_endpoint::TelemetryEndpointSettings, webhook_receiver::WebhookReceiverSettings,
};

/// Immutable settings of the bridge. Constructed once at startup and passed
/// into the components that need them.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub mattermost: MattermostSettings,
    pub webhook_receiver: WebhookReceiverSettings,
    pub telemetry_endpoint: TelemetryEndpointSettings,
    pub log: LogSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let opts = App::new(clap::crate_name!())
            .version(clap::crate_version!())
            .about(clap::crate_description!())
            .args([
                Arg::new("config")
                    .help("path of config file")
                    .takes_value(true)
                    .short('c')
                    .long("config")
                    .default_value("./config.yaml"),
                Arg::new("webhook-url")
                    .help("mattermost incoming webhook url")
                    .takes_value(true)
                    .long("webhook-url"),
                Arg::new("level")
                    .help("log level")
                    .possible_values(["error", "warn", "info", "debug", "trace"])
                    .ignore_case(true)
                    .takes_value(true)
                    .long("log"),
            ])
            .get_matches();

        let config_path = opts.value_of("config").unwrap();

        let conf = Config::builder()
            .add_source(config::File::with_name(config_path))
            .build()
            .context("can't load config")?;

        let mut settings: Settings = conf.try_deserialize().context("can't load config")?;

        if let Some(url) = opts.value_of("webhook-url") {
            settings.mattermost.url =
                Url::parse(url).context("invalid mattermost webhook url")?;
        }

        if let Some(level) = opts.value_of("level") {
            settings.log.level = level.to_string();
        }

        Ok(settings)
    }
}
