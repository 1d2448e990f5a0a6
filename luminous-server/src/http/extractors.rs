//! Custom Axum extractors

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use luminous_core::{AyahNumber, SurahNumber, ValidationError};

use super::error::ApiError;

/// Raw query-string parameters; typed lookups fail with a 400 naming the field
#[derive(Debug, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn optional(&self, field: &'static str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn required(&self, field: &'static str) -> Result<&str, ValidationError> {
        self.optional(field).ok_or(ValidationError::Missing { field })
    }

    pub fn surah(&self, field: &'static str) -> Result<SurahNumber, ValidationError> {
        SurahNumber::parse(field, self.required(field)?)
    }

    pub fn ayah(&self, field: &'static str) -> Result<AyahNumber, ValidationError> {
        AyahNumber::parse(field, self.required(field)?)
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(map) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri).map_err(|_| {
            ApiError::Validation(ValidationError::WrongType {
                field: "query",
                expected: "a valid query string",
            })
        })?;
        Ok(Self(map))
    }
}
