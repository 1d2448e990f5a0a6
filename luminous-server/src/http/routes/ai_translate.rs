//! Authenticated AI translation
//!
//! The bearer check is a route layer, so it runs before the method
//! fallback and before the body is read.

use axum::body::Bytes;
use axum::extract::State;
use axum::middleware;
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};

use luminous_core::{AyahNumber, SurahNumber, ValidationError};

use crate::auth::{require_auth, Principal};
use crate::http::error::ApiError;
use crate::http::preflight::expect_post;
use crate::state::AppState;
use crate::translate::TranslationRequest;

/// Longest accepted `verseText`, in characters
pub const MAX_VERSE_CHARS: usize = 4000;

#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub translation: String,
}

/// POST /api/v1/ai-translate
#[tracing::instrument(name = "ai_translate", skip_all)]
async fn ai_translate(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Bytes,
) -> Result<Json<TranslationResponse>, ApiError> {
    let request = parse_request(&body)?;
    tracing::debug!(
        user_id = %principal.user_id,
        surah = %request.surah,
        verse = %request.verse,
        chars = request.verse_text.chars().count(),
        "translating verse"
    );

    let translation = state.translator().translate(&request).await?;
    Ok(Json(TranslationResponse { translation }))
}

fn parse_request(body: &[u8]) -> Result<TranslationRequest, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::WrongType {
        field: "body",
        expected: "a JSON object",
    })?;
    let Value::Object(fields) = value else {
        return Err(ValidationError::WrongType {
            field: "body",
            expected: "a JSON object",
        });
    };

    let verse_text = verse_text(&fields)?;
    let surah = SurahNumber::new("surahId", integer(&fields, "surahId")?)?;
    let verse = AyahNumber::new("verseNumber", integer(&fields, "verseNumber")?)?;

    Ok(TranslationRequest {
        verse_text,
        surah,
        verse,
    })
}

fn verse_text(fields: &Map<String, Value>) -> Result<String, ValidationError> {
    const FIELD: &str = "verseText";
    let text = match fields.get(FIELD) {
        None | Some(Value::Null) => return Err(ValidationError::Missing { field: FIELD }),
        Some(Value::String(s)) => s.trim(),
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: FIELD,
                expected: "a string",
            })
        }
    };
    if text.is_empty() {
        return Err(ValidationError::Empty { field: FIELD });
    }
    if text.chars().count() > MAX_VERSE_CHARS {
        return Err(ValidationError::TooLong {
            field: FIELD,
            max: MAX_VERSE_CHARS,
        });
    }
    Ok(text.to_owned())
}

fn integer(fields: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing { field }),
        Some(Value::Number(n)) => n.as_i64().ok_or(ValidationError::WrongType {
            field,
            expected: "an integer",
        }),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "an integer",
        }),
    }
}

/// AI translation routes, guarded by [`require_auth`]
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/ai-translate",
            post(ai_translate).fallback(expect_post),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_valid_body() {
        let body = br#"{"verseText":"  bismillah ","surahId":1,"verseNumber":1}"#;
        let req = parse_request(body).unwrap();
        assert_eq!(req.verse_text, "bismillah");
        assert_eq!(req.surah.get(), 1);
        assert_eq!(req.verse.get(), 1);
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert_eq!(parse_request(b"not json").unwrap_err().field(), "body");
        assert_eq!(parse_request(b"[1,2]").unwrap_err().field(), "body");
    }

    fn reject(body: &str) -> ValidationError {
        parse_request(body.as_bytes()).unwrap_err()
    }

    #[test]
    fn checks_each_field() {
        let err = reject(r#"{"surahId":1,"verseNumber":1}"#);
        assert_eq!(err, ValidationError::Missing { field: "verseText" });

        let err = reject(r#"{"verseText":"   ","surahId":1,"verseNumber":1}"#);
        assert_eq!(err, ValidationError::Empty { field: "verseText" });

        let err = reject(r#"{"verseText":"x","surahId":"2","verseNumber":1}"#);
        assert!(matches!(err, ValidationError::WrongType { field: "surahId", .. }));

        let err = reject(r#"{"verseText":"x","surahId":115,"verseNumber":1}"#);
        assert_eq!(err.to_string(), "surahId must be between 1 and 114");

        let err = reject(r#"{"verseText":"x","surahId":2,"verseNumber":0}"#);
        assert_eq!(err.to_string(), "verseNumber must be at least 1");

        let err = reject(r#"{"verseText":"x","surahId":2,"verseNumber":1.5}"#);
        assert!(matches!(err, ValidationError::WrongType { field: "verseNumber", .. }));
    }

    #[test]
    fn limits_verse_length_in_characters() {
        // Multi-byte characters count once each
        let at_limit = "ب".repeat(MAX_VERSE_CHARS);
        let body = serde_json::json!({ "verseText": at_limit, "surahId": 2, "verseNumber": 255 });
        assert!(parse_request(body.to_string().as_bytes()).is_ok());

        let over = "a".repeat(MAX_VERSE_CHARS + 1);
        let body = serde_json::json!({ "verseText": over, "surahId": 2, "verseNumber": 255 });
        assert!(matches!(
            parse_request(body.to_string().as_bytes()),
            Err(ValidationError::TooLong { max: MAX_VERSE_CHARS, .. })
        ));
    }
}
