use axum::{response::IntoResponse, Json};
use serde::Serialize;

use crate::location::table::{Neighborhood, NEIGHBORHOODS};

#[derive(Debug, Serialize)]
pub struct NeighborhoodsResponse {
    pub object: &'static str,
    pub data: &'static [Neighborhood],
}

/// Handle /v1/neighborhoods
pub async fn list_neighborhoods() -> impl IntoResponse {
    Json(NeighborhoodsResponse {
        object: "list",
        data: NEIGHBORHOODS,
    })
}
