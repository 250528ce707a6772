use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::handlers::AppState;
use crate::model::ModelInfo;

#[derive(Debug, Serialize)]
pub struct ModelSummary {
    #[serde(flatten)]
    pub info: ModelInfo,
    /// Expected prediction over the training distribution
    pub baseline: f64,
}

/// Handle /v1/model
pub async fn model_summary(State(state): State<AppState>) -> Result<Json<ModelSummary>, AppError> {
    let valuator = state.service.model_state().valuator()?;

    Ok(Json(ModelSummary {
        info: valuator.model_info(),
        baseline: valuator.baseline(),
    }))
}
