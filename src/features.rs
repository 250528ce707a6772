use serde::{Deserialize, Serialize};

use crate::location::LocationResult;

/// Square feet in one square meter
pub const SQ_FT_PER_SQ_M: f64 = 10.764;

/// Tenure code injected into every record (leasehold)
pub const DEFAULT_TENURE: u8 = 1;

/// Energy rating code injected into every record (band C)
pub const DEFAULT_ENERGY_RATING: u8 = 2;

/// Accepted bedroom counts
pub const BEDROOMS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Accepted bathroom counts
pub const BATHROOMS_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

/// Smallest accepted floor area in square feet
pub const MIN_SIZE_SQ_FT: f64 = 100.0;

/// Number of model inputs
pub const FEATURE_COUNT: usize = 8;

/// Column names in the exact order the model was trained on
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "bedrooms",
    "bathrooms",
    "floorAreaSqM",
    "latitude",
    "longitude",
    "propertyType",
    "tenure",
    "currentEnergyRating",
];

/// Feature index constants, matching `FEATURE_NAMES`
pub mod index {
    pub const BEDROOMS: usize = 0;
    pub const BATHROOMS: usize = 1;
    pub const FLOOR_AREA: usize = 2;
    pub const LATITUDE: usize = 3;
    pub const LONGITUDE: usize = 4;
    pub const PROPERTY_TYPE: usize = 5;
    pub const TENURE: usize = 6;
    pub const ENERGY_RATING: usize = 7;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FeatureError {
    #[error("bedroom count must be between 1 and 10, got {0}")]
    Bedrooms(u32),
    #[error("bathroom count must be between 1 and 5, got {0}")]
    Bathrooms(u32),
    #[error("size must be at least 100 square feet, got {0}")]
    InvalidSize(f64),
}

/// Property type as the model encodes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    Unknown,
    Flat,
    Detached,
    Terraced,
}

impl PropertyType {
    pub fn code(&self) -> u8 {
        match self {
            PropertyType::Unknown => 0,
            PropertyType::Flat => 1,
            PropertyType::Detached => 2,
            PropertyType::Terraced => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Unknown => "unknown",
            PropertyType::Flat => "flat",
            PropertyType::Detached => "detached",
            PropertyType::Terraced => "terraced",
        }
    }
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" | "other" | "0" => Ok(PropertyType::Unknown),
            "flat" | "1" => Ok(PropertyType::Flat),
            "detached" | "2" => Ok(PropertyType::Detached),
            "terraced" | "3" => Ok(PropertyType::Terraced),
            _ => Err(format!(
                "invalid property type '{}' (expected unknown, flat, detached or terraced)",
                s
            )),
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw user-entered property attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub size_sq_ft: f64,
    #[serde(default)]
    pub property_type: PropertyType,
}

/// Model input row
///
/// Field order mirrors `FEATURE_NAMES`. Model inputs come only from `to_features`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floor_area_sq_m: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub property_type: u8,
    pub tenure: u8,
    pub energy_rating: u8,
}

impl PropertyRecord {
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.bedrooms),
            f64::from(self.bathrooms),
            self.floor_area_sq_m,
            self.latitude,
            self.longitude,
            f64::from(self.property_type),
            f64::from(self.tenure),
            f64::from(self.energy_rating),
        ]
    }
}

pub fn sq_ft_to_sq_m(sq_ft: f64) -> f64 {
    sq_ft / SQ_FT_PER_SQ_M
}

/// Assemble the model input row from user input and a resolved location
pub fn build_record(
    input: &PropertyInput,
    location: &LocationResult,
) -> Result<PropertyRecord, FeatureError> {
    if !BEDROOMS_RANGE.contains(&input.bedrooms) {
        return Err(FeatureError::Bedrooms(input.bedrooms));
    }
    if !BATHROOMS_RANGE.contains(&input.bathrooms) {
        return Err(FeatureError::Bathrooms(input.bathrooms));
    }
    if !input.size_sq_ft.is_finite() || input.size_sq_ft < MIN_SIZE_SQ_FT {
        return Err(FeatureError::InvalidSize(input.size_sq_ft));
    }

    Ok(PropertyRecord {
        bedrooms: input.bedrooms,
        bathrooms: input.bathrooms,
        floor_area_sq_m: sq_ft_to_sq_m(input.size_sq_ft),
        latitude: location.latitude,
        longitude: location.longitude,
        property_type: input.property_type.code(),
        tenure: DEFAULT_TENURE,
        energy_rating: DEFAULT_ENERGY_RATING,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Provenance;

    fn harrow() -> LocationResult {
        LocationResult {
            latitude: 51.5898,
            longitude: -0.3346,
            label: "Harrow".to_string(),
            provenance: Provenance::Table,
        }
    }

    fn input() -> PropertyInput {
        PropertyInput {
            bedrooms: 3,
            bathrooms: 1,
            size_sq_ft: 900.0,
            property_type: PropertyType::Flat,
        }
    }

    #[test]
    fn test_sq_ft_conversion() {
        assert!((sq_ft_to_sq_m(900.0) - 83.61).abs() < 0.01);
        assert!((sq_ft_to_sq_m(10.764) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_record_field_order() {
        let record = build_record(&input(), &harrow()).unwrap();
        let features = record.to_features();

        assert_eq!(features[index::BEDROOMS], 3.0);
        assert_eq!(features[index::BATHROOMS], 1.0);
        assert!((features[index::FLOOR_AREA] - 83.61).abs() < 0.01);
        assert_eq!(features[index::LATITUDE], 51.5898);
        assert_eq!(features[index::LONGITUDE], -0.3346);
        assert_eq!(features[index::PROPERTY_TYPE], 1.0);
        assert_eq!(features[index::TENURE], f64::from(DEFAULT_TENURE));
        assert_eq!(features[index::ENERGY_RATING], f64::from(DEFAULT_ENERGY_RATING));
    }

    #[test]
    fn test_build_record_rejects_invalid_input() {
        let mut bad = input();
        bad.bedrooms = 0;
        assert_eq!(build_record(&bad, &harrow()), Err(FeatureError::Bedrooms(0)));

        let mut bad = input();
        bad.bathrooms = 0;
        assert_eq!(build_record(&bad, &harrow()), Err(FeatureError::Bathrooms(0)));

        let mut bad = input();
        bad.size_sq_ft = 0.0;
        assert!(matches!(
            build_record(&bad, &harrow()),
            Err(FeatureError::InvalidSize(_))
        ));

        bad.size_sq_ft = f64::NAN;
        assert!(build_record(&bad, &harrow()).is_err());
    }

    #[test]
    fn test_build_record_enforces_form_ranges() {
        let mut bad = input();
        bad.bedrooms = 500;
        assert_eq!(build_record(&bad, &harrow()), Err(FeatureError::Bedrooms(500)));

        let mut bad = input();
        bad.bathrooms = 90;
        assert_eq!(build_record(&bad, &harrow()), Err(FeatureError::Bathrooms(90)));

        let mut bad = input();
        bad.size_sq_ft = 0.5;
        assert_eq!(build_record(&bad, &harrow()), Err(FeatureError::InvalidSize(0.5)));

        bad.size_sq_ft = 99.9;
        assert!(build_record(&bad, &harrow()).is_err());

        let mut edge = input();
        edge.bedrooms = 10;
        edge.bathrooms = 5;
        edge.size_sq_ft = 100.0;
        assert!(build_record(&edge, &harrow()).is_ok());

        edge.bedrooms = 1;
        edge.bathrooms = 1;
        assert!(build_record(&edge, &harrow()).is_ok());
    }

    #[test]
    fn test_property_type_codes() {
        assert_eq!(PropertyType::Unknown.code(), 0);
        assert_eq!(PropertyType::Flat.code(), 1);
        assert_eq!(PropertyType::Detached.code(), 2);
        assert_eq!(PropertyType::Terraced.code(), 3);
        assert_eq!("Detached".parse::<PropertyType>(), Ok(PropertyType::Detached));
        assert!("bungalow".parse::<PropertyType>().is_err());
    }
}
