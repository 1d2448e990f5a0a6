//! Bible chapter endpoint (LibSQL)

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use luminous_core::models::bible::validate_ident;
use luminous_core::BibleVerse;

use crate::http::error::ApiError;
use crate::http::extractors::QueryParams;
use crate::http::preflight::expect_get;
use crate::state::AppState;

/// GET /api/get-bible-chapter?bibleId=&chapterId=
#[tracing::instrument(name = "get_bible_chapter", skip_all)]
async fn get_bible_chapter(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<Vec<BibleVerse>>, ApiError> {
    let bible_id = validate_ident("bibleId", query.required("bibleId")?)?;
    let chapter_id = validate_ident("chapterId", query.required("chapterId")?)?;
    tracing::debug!(%bible_id, %chapter_id, "fetching chapter");

    Ok(Json(state.bible().chapter(&bible_id, &chapter_id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/get-bible-chapter",
        get(get_bible_chapter).fallback(expect_get),
    )
}
