use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::handlers::AppState;
use crate::valuation::ModelState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "property-valuer",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK once the price model is loaded, 503 with the load error otherwise
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.model_state() {
        ModelState::Ready(_) => (StatusCode::OK, Json(json!({
            "status": "ready",
            "service": "property-valuer",
        }))),
        ModelState::Unavailable(reason) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
            "status": "unavailable",
            "service": "property-valuer",
            "reason": reason,
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_follows_model_state() {
        let response = readiness_check(State(test_support::ready_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = readiness_check(State(test_support::unavailable_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
