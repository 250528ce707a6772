use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides, e.g. `VALUER__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "VALUER";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub geocoding: GeocodingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// XGBoost JSON model file
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/price_model.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub enabled: bool,
    /// Nominatim-compatible service root; `/search` is appended
    pub base_url: String,
    /// Sent as the User-Agent header, which Nominatim requires to identify the client
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Obsolete address terms removed before a second lookup attempt
    pub strip_terms: Vec<String>,
    /// Offline stand-ins used when a lookup fails and the query names one of these markers
    pub fallbacks: Vec<FallbackLocation>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("property-valuer/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 10,
            strip_terms: vec!["Middlesex".to_string()],
            fallbacks: vec![FallbackLocation {
                marker: "Harrow".to_string(),
                latitude: 51.5898,
                longitude: -0.3346,
                label: "Harrow (offline mode)".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FallbackLocation {
    pub marker: String,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Load configuration from an optional TOML file plus `VALUER__*` environment overrides
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if cfg.model.path.as_os_str().is_empty() {
        anyhow::bail!("Model path cannot be empty");
    }

    if !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint must start with '/'");
    }

    let geo = &cfg.geocoding;
    if geo.enabled {
        if geo.base_url.trim().is_empty() {
            anyhow::bail!("Geocoding base_url cannot be empty when geocoding is enabled");
        }
        if geo.user_agent.trim().is_empty() {
            anyhow::bail!("Geocoding user_agent cannot be empty");
        }
    }
    if geo.timeout_seconds == 0 || geo.timeout_seconds > 30 {
        anyhow::bail!(
            "Geocoding timeout must be between 1 and 30 seconds, got {}",
            geo.timeout_seconds
        );
    }

    for term in &geo.strip_terms {
        if term.trim().is_empty() {
            anyhow::bail!("Geocoding strip_terms cannot contain empty entries");
        }
    }

    for fallback in &geo.fallbacks {
        if fallback.marker.trim().is_empty() {
            anyhow::bail!("Fallback marker cannot be empty");
        }
        if !(-90.0..=90.0).contains(&fallback.latitude)
            || !(-180.0..=180.0).contains(&fallback.longitude)
        {
            anyhow::bail!(
                "Fallback '{}' has out-of-range coordinates ({}, {})",
                fallback.marker,
                fallback.latitude,
                fallback.longitude
            );
        }
    }

    Ok(())
}
