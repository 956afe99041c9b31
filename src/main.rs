use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use deezer_skill::config::{Config, DEFAULT_CONFIG_PATH};
use deezer_skill::deezer::DeezerClient;
use deezer_skill::hermes::HermesClient;
use deezer_skill::{skill, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("deezer_skill=debug")),
        )
        .init();

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);
    info!("Loaded configuration from: {}", config_path);

    let search = Arc::new(DeezerClient::new(&config.deezer)?);

    let (hermes, intents) = HermesClient::connect(&config.mqtt);
    hermes.subscribe_intents().await?;

    let state = AppState::new(config, Arc::new(hermes), search);
    skill::run(state, intents).await?;

    Ok(())
}
