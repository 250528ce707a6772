//! Nominatim-compatible geocoding client

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::GeocodingConfig;

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoder did not answer within {0:?}")]
    Timeout(Duration),

    #[error("geocoder returned HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("geocoder request failed: {0}")]
    Http(reqwest::Error),

    #[error("geocoder response could not be decoded: {0}")]
    Decode(String),
}

impl GeocodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            GeocodeError::Timeout(_) => "timeout",
            GeocodeError::Status { .. } => "http_status",
            GeocodeError::Http(_) => "http_error",
            GeocodeError::Decode(_) => "decode_error",
        }
    }
}

/// Best match for a query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl Geocoder {
    pub fn new(client: Client, base_url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    pub fn from_config(client: Client, config: &GeocodingConfig) -> Self {
        Self::new(
            client,
            config.base_url.clone(),
            config.user_agent.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Look up the single best match for `query`
    ///
    /// `Ok(None)` means the service answered but found nothing.
    pub async fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeocodeError::Status { status, message });
        }

        let results: Vec<SearchResult> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeocodeError::Timeout(self.timeout)
            } else {
                GeocodeError::Decode(e.to_string())
            }
        })?;

        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let latitude = first
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|_| GeocodeError::Decode(format!("invalid latitude '{}'", first.lat)))?;
        let longitude = first
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|_| GeocodeError::Decode(format!("invalid longitude '{}'", first.lon)))?;
        if !super::coordinates_in_range(latitude, longitude) {
            return Err(GeocodeError::Decode(format!(
                "coordinates out of range ({}, {})",
                latitude, longitude
            )));
        }

        Ok(Some(GeocodeHit {
            latitude,
            longitude,
            display_name: first.display_name,
        }))
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> GeocodeError {
        if err.is_timeout() {
            GeocodeError::Timeout(self.timeout)
        } else {
            GeocodeError::Http(err)
        }
    }
}

/// Short label from a Nominatim display name: first and second-to-last segments
///
/// Nominatim puts a house number in its own segment, so a purely numeric
/// first segment is merged with the street that follows it.
pub fn short_label(display_name: &str) -> String {
    let mut parts: Vec<&str> = display_name
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() > 1 && parts[0].chars().all(|c| c.is_ascii_digit()) {
        let merged = format!("{} {}", parts[0], parts[1]);
        let rest = parts.split_off(2);
        return join_short(&merged, &rest);
    }

    match parts.len() {
        0 => display_name.trim().to_string(),
        1 => parts[0].to_string(),
        2 => format!("{}, {}", parts[0], parts[1]),
        n => format!("{}, {}", parts[0], parts[n - 2]),
    }
}

fn join_short(head: &str, rest: &[&str]) -> String {
    match rest.len() {
        0 => head.to_string(),
        1 => format!("{}, {}", head, rest[0]),
        n => format!("{}, {}", head, rest[n - 2]),
    }
}
