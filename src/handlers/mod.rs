pub mod estimate;
pub mod health;
pub mod metrics_handler;
pub mod model_info;
pub mod neighborhoods;

use std::sync::Arc;

use crate::config::Config;
use crate::valuation::ValuationService;

/// Shared state for the API routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<ValuationService>,
}

impl AppState {
    pub fn new(config: Config, service: ValuationService) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::GeocodingConfig;
    use crate::location::LocationResolver;
    use crate::model::{Model, Node, Tree};
    use crate::valuation::{ModelState, Valuator};

    /// One split on floor area: 300k base, +20k below 80 m², +60k above
    pub fn model() -> Model {
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

    pub fn state(model: ModelState) -> AppState {
        let geocoding = GeocodingConfig {
            enabled: false,
            ..GeocodingConfig::default()
        };
        let resolver = LocationResolver::from_config(reqwest::Client::new(), &geocoding);
        AppState::new(Config::default(), ValuationService::new(model, resolver))
    }

    pub fn ready_state() -> AppState {
        state(ModelState::Ready(Arc::new(Valuator::new(model()))))
    }

    pub fn unavailable_state() -> AppState {
        state(ModelState::Unavailable("models/price_model.json: not found".to_string()))
    }
}
