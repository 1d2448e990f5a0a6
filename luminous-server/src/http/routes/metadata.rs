//! Metadata endpoints
//!
//! v1 and v2 share a handler shape and differ in backend and accepted
//! types. The backend behind each is chosen in `AppState::from_settings`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use luminous_core::{MetadataKind, MetadataPayload, ValidationError};

use crate::http::error::ApiError;
use crate::http::extractors::QueryParams;
use crate::http::preflight::expect_get;
use crate::state::AppState;

const FIELD: &str = "type";

/// GET /api/get-metadata?type=surah-list|sajdas|navigation-indices
#[tracing::instrument(name = "get_metadata", skip_all)]
async fn get_metadata(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<MetadataPayload>, ApiError> {
    let kind = MetadataKind::parse(FIELD, query.required(FIELD)?)?;
    if kind == MetadataKind::NavigationIndices {
        return Err(ApiError::NotImplemented {
            feature: kind.as_str().to_owned(),
        });
    }

    let source = state.metadata_v1();
    tracing::debug!(kind = kind.as_str(), backend = source.backend(), "fetching metadata");
    Ok(Json(source.fetch(kind).await?))
}

/// GET /api/v2/get-metadata?type=surah-list|sajdas
#[tracing::instrument(name = "get_metadata_v2", skip_all)]
async fn get_metadata_v2(
    State(state): State<AppState>,
    query: QueryParams,
) -> Result<Json<MetadataPayload>, ApiError> {
    let kind = parse_v2(query.required(FIELD)?)?;

    let source = state.metadata_v2();
    tracing::debug!(kind = kind.as_str(), backend = source.backend(), "fetching metadata");
    Ok(Json(source.fetch(kind).await?))
}

fn parse_v2(raw: &str) -> Result<MetadataKind, ValidationError> {
    match MetadataKind::parse(FIELD, raw) {
        Ok(kind @ (MetadataKind::SurahList | MetadataKind::Sajdas)) => Ok(kind),
        Err(e @ ValidationError::Empty { .. }) => Err(e),
        _ => Err(ValidationError::InvalidVariant {
            field: FIELD,
            value: raw.to_owned(),
            expected: "surah-list or sajdas",
        }),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/get-metadata", get(get_metadata).fallback(expect_get))
        .route("/api/v2/get-metadata", get(get_metadata_v2).fallback(expect_get))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_rejects_navigation_indices() {
        assert_eq!(parse_v2("sajdas").unwrap(), MetadataKind::Sajdas);
        let err = parse_v2("navigation-indices").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid type value: 'navigation-indices' (expected surah-list or sajdas)"
        );
        assert_eq!(parse_v2("").unwrap_err(), ValidationError::Empty { field: "type" });
    }
}
