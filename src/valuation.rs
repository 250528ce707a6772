//! The estimate pipeline: resolve location, build the record, predict, attribute.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::explain::{AttributionResult, Explainer};
use crate::features::{self, FeatureError, PropertyInput, PropertyRecord};
use crate::location::{LocationError, LocationQuery, LocationResolver, LocationResult};
use crate::metrics;
use crate::model::{self, Model, ModelInfo};

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("price model is unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("invalid property details: {0}")]
    InvalidInput(#[from] FeatureError),

    #[error("model produced a non-finite estimate ({0})")]
    NonFinite(f64),
}

impl ValuationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValuationError::ModelUnavailable(_) => "model_unavailable",
            ValuationError::Location(LocationError::AddressNotFound { .. }) => "location_not_found",
            ValuationError::Location(_) | ValuationError::InvalidInput(_) => "invalid_input",
            ValuationError::NonFinite(_) => "non_finite_estimate",
        }
    }
}

/// One user action: property details plus a location in any mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(flatten)]
    pub property: PropertyInput,
    pub location: LocationQuery,
}

/// Result of one estimate; rebuilt for every request
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub estimate: f64,
    pub attribution: AttributionResult,
    pub location: LocationResult,
    pub record: PropertyRecord,
}

/// Loaded model together with its explainer
pub struct Valuator {
    model: Arc<Model>,
    explainer: Explainer,
}

impl Valuator {
    pub fn new(model: Model) -> Self {
        let model = Arc::new(model);
        let explainer = Explainer::new(model.clone());
        Self { model, explainer }
    }

    pub fn predict(&self, record: &PropertyRecord) -> f64 {
        self.model.predict(record)
    }

    pub fn explain(&self, record: &PropertyRecord) -> AttributionResult {
        self.explainer.explain(record)
    }

    pub fn baseline(&self) -> f64 {
        self.explainer.baseline()
    }

    pub fn model_info(&self) -> ModelInfo {
        self.model.info()
    }

    /// Build the record for a resolved location and run predict + explain on it
    pub fn estimate(
        &self,
        input: &PropertyInput,
        location: LocationResult,
    ) -> Result<PredictionResponse, ValuationError> {
        let record = features::build_record(input, &location)?;

        let estimate = self.predict(&record);
        if !estimate.is_finite() {
            return Err(ValuationError::NonFinite(estimate));
        }
        let attribution = self.explain(&record);

        Ok(PredictionResponse {
            estimate,
            attribution,
            location,
            record,
        })
    }
}

/// Process-wide model handle, loaded once at startup
pub enum ModelState {
    Ready(Arc<Valuator>),
    Unavailable(String),
}

impl ModelState {
    /// Load the model; a failure is captured rather than returned so callers
    /// can keep serving and report it on every estimate attempt.
    pub fn load(path: &Path) -> Self {
        match model::load_model(path) {
            Ok(model) => ModelState::Ready(Arc::new(Valuator::new(model))),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load price model, estimates are disabled");
                ModelState::Unavailable(e.to_string())
            }
        }
    }

    pub fn valuator(&self) -> Result<&Arc<Valuator>, ValuationError> {
        match self {
            ModelState::Ready(valuator) => Ok(valuator),
            ModelState::Unavailable(reason) => Err(ValuationError::ModelUnavailable(reason.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// Everything needed to answer an estimate request
pub struct ValuationService {
    model: ModelState,
    resolver: LocationResolver,
}

impl ValuationService {
    pub fn new(model: ModelState, resolver: LocationResolver) -> Self {
        Self { model, resolver }
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model
    }

    pub async fn estimate(&self, request: &EstimateRequest) -> Result<PredictionResponse, ValuationError> {
        let start = Instant::now();
        let mode = request.location.mode();

        let result = self.run(request).await;

        match &result {
            Ok(response) => {
                metrics::record_estimate(mode, start.elapsed());
                info!(
                    mode = mode,
                    provenance = %response.location.provenance,
                    estimate = response.estimate,
                    duration_ms = start.elapsed().as_millis(),
                    "Completed estimate"
                );
            }
            Err(e) => {
                metrics::record_error(e.kind());
                info!(mode = mode, error = %e, "Estimate failed");
            }
        }

        result
    }

    async fn run(&self, request: &EstimateRequest) -> Result<PredictionResponse, ValuationError> {
        // A missing model disables everything, including the geocoder call.
        let valuator = self.model.valuator()?;
        let location = self.resolver.resolve(&request.location).await?;
        valuator.estimate(&request.property, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeocodingConfig;
    use crate::features::PropertyType;
    use crate::location::Provenance;
    use crate::model::{Node, Tree};

    fn model() -> Model {
        Model::new(
            300000.0,
            vec![Tree::new(vec![
                Node::Split {
                    feature: 2,
                    threshold: 80.0,
                    left: 1,
                    right: 2,
                    default_left: true,
                    cover: 100.0,
                },
                Node::Leaf { value: 20000.0, cover: 40.0 },
                Node::Leaf { value: 60000.0, cover: 60.0 },
            ])
            .unwrap()],
            "reg:squarederror",
        )
    }

    fn offline_resolver() -> LocationResolver {
        LocationResolver::from_config(
            reqwest::Client::new(),
            &GeocodingConfig {
                enabled: false,
                ..GeocodingConfig::default()
            },
        )
    }

    fn request(location: LocationQuery) -> EstimateRequest {
        EstimateRequest {
            property: PropertyInput {
                bedrooms: 3,
                bathrooms: 1,
                size_sq_ft: 900.0,
                property_type: PropertyType::Flat,
            },
            location,
        }
    }

    #[tokio::test]
    async fn test_estimate_with_neighborhood() {
        let service = ValuationService::new(
            ModelState::Ready(Arc::new(Valuator::new(model()))),
            offline_resolver(),
        );

        let response = service
            .estimate(&request(LocationQuery::Neighborhood {
                name: "Harrow".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(response.estimate, 360000.0);
        assert_eq!(response.location.provenance, Provenance::Table);
        assert!((response.attribution.reconstructed() - response.estimate).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_unavailable_model_disables_estimates() {
        let service = ValuationService::new(
            ModelState::load(Path::new("/nonexistent/model.json")),
            offline_resolver(),
        );
        assert!(!service.model_state().is_ready());

        let err = service
            .estimate(&request(LocationQuery::Neighborhood {
                name: "Harrow".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "model_unavailable");
        assert!(err.to_string().contains("model.json"));
    }

    #[tokio::test]
    async fn test_invalid_input_is_reported() {
        let service = ValuationService::new(
            ModelState::Ready(Arc::new(Valuator::new(model()))),
            offline_resolver(),
        );
        let mut req = request(LocationQuery::Manual {
            latitude: 51.5,
            longitude: -0.1,
        });
        req.property.size_sq_ft = -5.0;

        let err = service.estimate(&req).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_estimate_request_json() {
        let req: EstimateRequest = serde_json::from_str(
            r#"{"bedrooms":2,"bathrooms":1,"size_sq_ft":650,"property_type":"terraced",
                "location":{"mode":"neighborhood","name":"Hackney"}}"#,
        )
        .unwrap();
        assert_eq!(req.property.property_type, PropertyType::Terraced);
        assert_eq!(req.location.mode(), "neighborhood");
    }
}
