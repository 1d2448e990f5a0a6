//! Surah description endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use luminous_core::SurahDescription;

use crate::http::error::ApiError;
use crate::http::extractors::QueryParams;
use crate::http::preflight::expect_get;
use crate::state::AppState;

/// GET /api/get-surah-description?surah=
#[tracing::instrument(name = "get_surah_description", skip_all)]
async fn get_surah_description(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<SurahDescription>, ApiError> {
    let surah = query.surah("surah")?;
    tracing::debug!(%surah, "fetching description");

    let description = state
        .quran()
        .surah_description(surah)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "surah description",
            id: surah.to_string(),
        })?;
    Ok(Json(description))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/get-surah-description",
        get(get_surah_description).fallback(expect_get),
    )
}
