//! Location resolution
//!
//! A location arrives in one of three modes (curated neighborhood, free-text
//! address, manual coordinates) and always leaves as a [`LocationResult`].

pub mod fallback;
pub mod geocoder;
pub mod table;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{FallbackLocation, GeocodingConfig};
use crate::metrics;
pub use geocoder::{GeocodeError, GeocodeHit, Geocoder};

/// How a location was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Lookup,
    Table,
    Manual,
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Lookup => "lookup",
            Provenance::Table => "table",
            Provenance::Manual => "manual",
            Provenance::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub provenance: Provenance,
}

/// User-selected location input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LocationQuery {
    Neighborhood { name: String },
    Address { query: String },
    Manual { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    pub fn mode(&self) -> &'static str {
        match self {
            LocationQuery::Neighborhood { .. } => "neighborhood",
            LocationQuery::Address { .. } => "address",
            LocationQuery::Manual { .. } => "manual",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LocationError {
    #[error("unknown neighborhood '{name}' (choose one of: {available})")]
    UnknownNeighborhood { name: String, available: String },

    #[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("address cannot be empty")]
    EmptyAddress,

    #[error(
        "address '{query}' could not be found; try a postcode only (e.g. HA3 5NE) \
         or switch to a neighborhood or manual coordinates"
    )]
    AddressNotFound { query: String },
}

/// Maps a [`LocationQuery`] to coordinates
pub struct LocationResolver {
    geocoder: Option<Geocoder>,
    strip_terms: Vec<String>,
    fallbacks: Vec<FallbackLocation>,
}

impl LocationResolver {
    pub fn new(geocoder: Option<Geocoder>, strip_terms: Vec<String>, fallbacks: Vec<FallbackLocation>) -> Self {
        Self {
            geocoder,
            strip_terms,
            fallbacks,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &GeocodingConfig) -> Self {
        let geocoder = config
            .enabled
            .then(|| Geocoder::from_config(client, config));
        Self::new(geocoder, config.strip_terms.clone(), config.fallbacks.clone())
    }

    pub async fn resolve(&self, query: &LocationQuery) -> Result<LocationResult, LocationError> {
        match query {
            LocationQuery::Neighborhood { name } => resolve_neighborhood(name),
            LocationQuery::Manual {
                latitude,
                longitude,
            } => resolve_manual(*latitude, *longitude),
            LocationQuery::Address { query } => self.resolve_address(query).await,
        }
    }

    async fn resolve_address(&self, query: &str) -> Result<LocationResult, LocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocationError::EmptyAddress);
        }

        if let Some(geocoder) = &self.geocoder {
            if let Some(hit) = self.lookup(geocoder, query).await {
                return Ok(LocationResult {
                    latitude: hit.latitude,
                    longitude: hit.longitude,
                    label: geocoder::short_label(&hit.display_name),
                    provenance: Provenance::Lookup,
                });
            }
        }

        if let Some(fallback) = fallback::match_fallback(query, &self.fallbacks) {
            warn!(
                query = %query,
                marker = %fallback.marker,
                "Address lookup failed, using offline fallback location"
            );
            metrics::record_geocode("fallback");
            return Ok(LocationResult {
                latitude: fallback.latitude,
                longitude: fallback.longitude,
                label: fallback.label.clone(),
                provenance: Provenance::Fallback,
            });
        }

        Err(LocationError::AddressNotFound {
            query: query.to_string(),
        })
    }

    /// Lookup with a single cleaned-up second attempt when the first finds nothing
    async fn lookup(&self, geocoder: &Geocoder, query: &str) -> Option<GeocodeHit> {
        match geocoder.search(query).await {
            Ok(Some(hit)) => {
                metrics::record_geocode("hit");
                info!(query = %query, label = %hit.display_name, "Geocoded address");
                return Some(hit);
            }
            Ok(None) => {
                metrics::record_geocode("no_match");
                info!(query = %query, "Geocoder found no match");
            }
            Err(e) => {
                metrics::record_geocode(e.kind());
                warn!(query = %query, error = %e, "Geocoding failed");
                return None;
            }
        }

        let cleaned = fallback::strip_terms(query, &self.strip_terms)?;
        if cleaned.is_empty() {
            return None;
        }

        info!(query = %cleaned, "Retrying lookup without obsolete address terms");
        match geocoder.search(&cleaned).await {
            Ok(Some(hit)) => {
                metrics::record_geocode("hit");
                Some(hit)
            }
            Ok(None) => {
                metrics::record_geocode("no_match");
                None
            }
            Err(e) => {
                metrics::record_geocode(e.kind());
                warn!(query = %cleaned, error = %e, "Geocoding failed");
                None
            }
        }
    }
}

fn resolve_neighborhood(name: &str) -> Result<LocationResult, LocationError> {
    let entry = table::find(name).ok_or_else(|| LocationError::UnknownNeighborhood {
        name: name.to_string(),
        available: table::names().join(", "),
    })?;

    Ok(LocationResult {
        latitude: entry.latitude,
        longitude: entry.longitude,
        label: entry.label.to_string(),
        provenance: Provenance::Table,
    })
}

fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

fn resolve_manual(latitude: f64, longitude: f64) -> Result<LocationResult, LocationError> {
    if !coordinates_in_range(latitude, longitude) {
        return Err(LocationError::InvalidCoordinates {
            latitude,
            longitude,
        });
    }

    Ok(LocationResult {
        latitude,
        longitude,
        label: format!("{:.4}, {:.4}", latitude, longitude),
        provenance: Provenance::Manual,
    })
}
