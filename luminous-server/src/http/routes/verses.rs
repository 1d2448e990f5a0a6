//! Verse endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use luminous_core::Verse;

use crate::http::error::ApiError;
use crate::http::extractors::QueryParams;
use crate::http::preflight::expect_get;
use crate::state::AppState;

/// GET /api/get-verse?surah=&ayah= - a single verse
#[tracing::instrument(name = "get_verse", skip_all)]
async fn get_verse(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Verse>, ApiError> {
    let surah = query.surah("surah")?;
    let ayah = query.ayah("ayah")?;
    tracing::debug!(%surah, %ayah, "fetching verse");

    let verse = state
        .quran()
        .verse(surah, ayah)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "verse",
            id: format!("{}:{}", surah, ayah),
        })?;
    Ok(Json(verse))
}

/// GET /api/get-verses?surah= - every verse of a surah, in order
#[tracing::instrument(name = "get_verses", skip_all)]
async fn get_verses(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Vec<Verse>>, ApiError> {
    let surah = query.surah("surah")?;
    tracing::debug!(%surah, "fetching verses");

    Ok(Json(state.quran().verses(surah).await?))
}

/// Verse routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/get-verse", get(get_verse).fallback(expect_get))
        .route("/api/get-verses", get(get_verses).fallback(expect_get))
}
