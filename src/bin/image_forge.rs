use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use image_forge::config::ServerConfig;
use image_forge::drivers::GeminiDriver;
use image_forge::server::{self, AppState};
use image_forge::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("loading configuration")?;
    telemetry::init_tracing();

    if config.api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; requests must carry their own apiKey");
    }
    if let Some(dir) = &config.static_dir {
        info!(dir = %dir.display(), "serving static client");
    }

    let driver = GeminiDriver::from_base_url(&config.base_url)
        .context("building provider transport")?;
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone(), Arc::new(driver)));

    server::serve(&config, server::router(state))
        .await
        .context("running server")?;
    Ok(())
}
