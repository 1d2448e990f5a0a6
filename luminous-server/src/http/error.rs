//! API error types with IntoResponse
//!
//! Every error becomes the JSON envelope `{error, details?, code?}`.
//! Server-side failures are logged here, once, at `error`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use luminous_core::{ConfigError, ValidationError};

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::translate::TranslateError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Missing or invalid credential (401)
    Unauthorized { reason: &'static str },

    /// Verified caller not allowed (403)
    Forbidden { reason: &'static str },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Wrong HTTP verb (405)
    MethodNotAllowed { allowed: &'static str },

    /// Known but unimplemented request (501)
    NotImplemented { feature: String },

    /// Required setting missing or malformed (500)
    Config(ConfigError),

    /// Third-party service failed (500)
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Datastore failure (500, logged)
    Database(StoreError),

    /// Internal error (500)
    Internal { message: String },
}

/// Serialized error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            code: None,
        }
    }

    fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::Config(_)
            | Self::Upstream { .. }
            | Self::Database(_)
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(e) => ErrorBody::new("Invalid request").details(e.to_string()),
            Self::Unauthorized { reason } => ErrorBody::new("Unauthorized").details(*reason),
            Self::Forbidden { reason } => ErrorBody::new("Forbidden").details(*reason),
            Self::NotFound { resource, id } => {
                ErrorBody::new("Not found").details(format!("{} '{}' not found", resource, id))
            }
            Self::MethodNotAllowed { allowed } => ErrorBody::new("Method not allowed")
                .details(format!("use {}", allowed)),
            Self::NotImplemented { feature } => {
                ErrorBody::new("Not implemented").details(format!("{} is not implemented", feature))
            }
            Self::Config(e) => {
                tracing::error!(error = %e, "Configuration error");
                ErrorBody::new("Server configuration error").details(e.to_string())
            }
            Self::Upstream { service, message } => {
                tracing::error!(service, error = %message, "Upstream error");
                ErrorBody::new("Upstream service error")
                    .details(format!("{} request failed", service))
            }
            Self::Database(e) => {
                // Log the actual error, return a classification
                tracing::error!("Database error: {}", e);
                ErrorBody {
                    error: "Database error".to_string(),
                    details: Some(classify(e).to_string()),
                    code: e.code(),
                }
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                ErrorBody::new("Internal server error")
            }
        }
    }
}

/// Safe one-line description of a datastore failure.
fn classify(e: &StoreError) -> &'static str {
    match e {
        StoreError::Sqlx(sqlx::Error::PoolTimedOut) => "timed out waiting for a connection",
        StoreError::Sqlx(sqlx::Error::PoolClosed) => "connection pool is closed",
        StoreError::Sqlx(sqlx::Error::Io(_) | sqlx::Error::Tls(_)) => {
            "could not reach the database"
        }
        StoreError::Sqlx(sqlx::Error::Database(_)) | StoreError::Libsql { .. } => "query failed",
        StoreError::Decode { .. } | StoreError::Sqlx(sqlx::Error::ColumnDecode { .. }) => {
            "unexpected row shape"
        }
        _ => "datastore request failed",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        let mut response = (status, Json(body)).into_response();

        if let Self::MethodNotAllowed { allowed } = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allowed));
        }
        response
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            StoreError::Config(c) => Self::Config(c),
            StoreError::Upstream { service, message } => Self::Upstream { service, message },
            _ => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => Self::Unauthorized {
                reason: "missing bearer token",
            },
            AuthError::InvalidToken => Self::Unauthorized {
                reason: "invalid or expired token",
            },
            AuthError::UnauthorizedParty => Self::Forbidden {
                reason: "token not issued for this application",
            },
            AuthError::Config(c) => Self::Config(c),
            AuthError::Upstream(message) => Self::Upstream {
                service: "clerk",
                message,
            },
        }
    }
}

impl From<TranslateError> for ApiError {
    fn from(e: TranslateError) -> Self {
        match e {
            TranslateError::Config(c) => Self::Config(c),
            other => Self::Upstream {
                service: "openrouter",
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400_naming_the_field() {
        let err = ApiError::Validation(ValidationError::OutOfRange {
            field: "surah",
            min: 1,
            max: Some(114),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "surah must be between 1 and 114");
        assert!(body.get("code").is_none());
    }

    #[tokio::test]
    async fn missing_config_names_the_variable() {
        let err = ApiError::from(StoreError::Config(ConfigError::Missing {
            key: "DATABASE_URL",
        }));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server configuration error");
        assert_eq!(body["details"], "DATABASE_URL is not set");
    }

    #[tokio::test]
    async fn store_not_found_is_404() {
        let err = ApiError::from(StoreError::NotFound {
            resource: "verse",
            id: "2:1000000".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn libsql_errors_carry_their_code() {
        let err = ApiError::from(StoreError::Libsql {
            message: "no such table: bible_verses".into(),
            code: Some("SQLITE_ERROR".into()),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "SQLITE_ERROR");
        assert_eq!(body["details"], "query failed");
    }

    #[tokio::test]
    async fn pool_timeout_is_classified() {
        let err = ApiError::from(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        let (_, body) = body_json(err).await;
        assert_eq!(body["details"], "timed out waiting for a connection");
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(ApiError::from(AuthError::MissingToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::InvalidToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(AuthError::UnauthorizedParty).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let response = ApiError::MethodNotAllowed { allowed: "GET" }.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }
}
