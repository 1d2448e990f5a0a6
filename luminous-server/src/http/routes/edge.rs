//! Edge Config metadata passthrough

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::preflight::expect_get;
use crate::state::AppState;

const ITEM: &str = "quranMetadata";

/// GET /api/get-edge-quran-metadata
#[tracing::instrument(name = "get_edge_quran_metadata", skip_all)]
async fn get_edge_quran_metadata(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let item = state.edge().item(ITEM).await?.ok_or_else(|| ApiError::NotFound {
        resource: "edge config item",
        id: ITEM.to_owned(),
    })?;
    Ok(Json(item))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/get-edge-quran-metadata",
        get(get_edge_quran_metadata).fallback(expect_get),
    )
}
