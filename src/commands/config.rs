use anyhow::Result;
use colored::Colorize;
use property_valuer::config;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration, file and environment overrides merged
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Model: {}", cfg.model.path.display());
    println!(
        "  Geocoding: {}",
        if cfg.geocoding.enabled { "enabled" } else { "disabled" }
    );
    println!("  Fallback markers: {}", cfg.geocoding.fallbacks.len());

    info!("Configuration validation successful");
    Ok(())
}
