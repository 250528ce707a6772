use anyhow::{bail, Result};
use colored::Colorize;
use property_valuer::config;
use property_valuer::valuation::ModelState;
use std::path::Path;
use tracing::info;

/// Execute the test command
///
/// Validates the configuration and loads the price model without starting the server
pub fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    let cfg = config::load_config(config_path)?;
    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Model".cyan(), cfg.model.path.display());
    println!(
        "  {}: {}",
        "Geocoding".cyan(),
        if cfg.geocoding.enabled {
            format!("{} ({}s timeout)", cfg.geocoding.base_url, cfg.geocoding.timeout_seconds).green()
        } else {
            "disabled".red()
        }
    );
    println!("  {}: {}", "Fallback markers".cyan(), cfg.geocoding.fallbacks.len());
    for fallback in &cfg.geocoding.fallbacks {
        println!(
            "    {} → {} ({:.4}, {:.4})",
            fallback.marker, fallback.label, fallback.latitude, fallback.longitude
        );
    }
    println!(
        "  {}: {}",
        "Metrics".cyan(),
        if cfg.metrics.enabled {
            cfg.metrics.endpoint.green()
        } else {
            "disabled".red()
        }
    );
    println!();

    println!("{}", "Loading price model...".yellow());
    match ModelState::load(&cfg.model.path) {
        ModelState::Ready(valuator) => {
            let info = valuator.model_info();
            println!("{}", "✓ Model loaded".green());
            println!("  {}: {}", "Objective".cyan(), info.objective);
            println!("  {}: {}", "Trees".cyan(), info.num_trees);
            println!("  {}: {:.2}", "Base score".cyan(), info.base_score);
            println!("  {}: {:.2}", "Baseline".cyan(), valuator.baseline());
        }
        ModelState::Unavailable(reason) => {
            println!("{} {}", "✗ Model failed to load:".red(), reason);
            bail!("price model is unavailable: {}", reason);
        }
    }

    info!("Configuration test completed successfully");
    Ok(())
}
