//! HTTP request handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::Product;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    query: String,
    results: Vec<Product>,
}

/// `GET /api/search?query=…` — price-sorted products across all sources.
/// An empty query or a query nothing matches returns an empty result list,
/// not an error.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, StatusCode> {
    match state.service.search(&params.query).await {
        Ok(results) => Ok(Json(SearchResponse {
            query: params.query,
            results,
        })),
        Err(e) => {
            error!(error = %e, "search failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// `GET /healthz`
pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
