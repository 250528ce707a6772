use anyhow::Result;
use colored::Colorize;
use property_valuer::{config, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting property valuer...".green());

    let cfg = config::load_config(config_path)?;
    info!(
        config = %config_path.display(),
        model = %cfg.model.path.display(),
        geocoding = cfg.geocoding.enabled,
        "Configuration loaded"
    );

    server::start_server(cfg).await
}
