use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::AppError;
use crate::handlers::AppState;
use crate::presenter::{self, EstimateView};
use crate::valuation::EstimateRequest;

/// Handle POST /v1/estimate
pub async fn create_estimate(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<EstimateView>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let response = state.service.estimate(&request).await?;

    Ok(Json(presenter::present(&response)))
}
