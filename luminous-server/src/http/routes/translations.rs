//! Translated verse endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use luminous_core::{TranslatedVerse, TranslatorKey};

use crate::http::error::ApiError;
use crate::http::extractors::QueryParams;
use crate::http::preflight::expect_get;
use crate::state::AppState;

/// GET /api/get-translation-verses?surah=&translator=en.yusufali
#[tracing::instrument(name = "get_translation_verses", skip_all)]
async fn get_translation_verses(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Vec<TranslatedVerse>>, ApiError> {
    let surah = query.surah("surah")?;
    let translator = TranslatorKey::parse("translator", query.required("translator")?)?;
    tracing::debug!(%surah, translator = translator.as_str(), "fetching translation");

    Ok(Json(
        state.quran().translation_verses(surah, translator).await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/get-translation-verses",
        get(get_translation_verses).fallback(expect_get),
    )
}
