use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::location::LocationError;
use crate::valuation::ValuationError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Malformed body, invalid property details or an unusable location
    InvalidInput(String),
    /// Address lookup and offline fallbacks all failed
    LocationNotFound(String),
    /// The price model failed to load at startup
    ModelUnavailable(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::LocationNotFound(msg) => write!(f, "Location not found: {}", msg),
            Self::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::LocationNotFound(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::ModelUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::InvalidInput(_) => "invalid_input",
        AppError::LocationNotFound(_) => "location_not_found",
        AppError::ModelUnavailable(_) => "model_unavailable",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<ValuationError> for AppError {
    fn from(err: ValuationError) -> Self {
        let message = err.to_string();
        match err {
            ValuationError::ModelUnavailable(_) => Self::ModelUnavailable(message),
            ValuationError::Location(LocationError::AddressNotFound { .. }) => {
                Self::LocationNotFound(message)
            }
            ValuationError::Location(_) | ValuationError::InvalidInput(_) => {
                Self::InvalidInput(message)
            }
            ValuationError::NonFinite(_) => Self::InternalError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureError;

    #[test]
    fn test_error_display() {
        let error = AppError::ModelUnavailable("missing file".to_string());
        assert_eq!(error.to_string(), "Model unavailable: missing file");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(
            error_type_name(&AppError::LocationNotFound("x".to_string())),
            "location_not_found"
        );
        assert_eq!(
            error_type_name(&AppError::InvalidInput("x".to_string())),
            "invalid_input"
        );
    }

    #[test]
    fn test_from_valuation_error() {
        let err: AppError = ValuationError::Location(LocationError::AddressNotFound {
            query: "nowhere".to_string(),
        })
        .into();
        assert!(matches!(err, AppError::LocationNotFound(_)));

        let err: AppError = ValuationError::InvalidInput(FeatureError::Bedrooms(0)).into();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err: AppError = ValuationError::Location(LocationError::EmptyAddress).into();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err: AppError = ValuationError::ModelUnavailable("gone".to_string()).into();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[test]
    fn test_metric_label_matches_response_type() {
        let errors = vec![
            ValuationError::ModelUnavailable("gone".to_string()),
            ValuationError::Location(LocationError::AddressNotFound {
                query: "nowhere".to_string(),
            }),
            ValuationError::Location(LocationError::EmptyAddress),
            ValuationError::Location(LocationError::InvalidCoordinates {
                latitude: 91.0,
                longitude: 0.0,
            }),
            ValuationError::InvalidInput(FeatureError::Bathrooms(9)),
        ];

        for err in errors {
            let kind = err.kind();
            assert_eq!(error_type_name(&AppError::from(err)), kind);
        }
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = AppError::ModelUnavailable("gone".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = AppError::LocationNotFound("nowhere".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
