//! OPTIONS short-circuit and method/route fallbacks

use axum::extract::Request;
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;

/// Answer any `OPTIONS` with an empty 200 before auth or validation.
///
/// Sits inside the CORS layer, which still decorates the response.
pub async fn short_circuit_options(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        tracing::trace!(path = %req.uri().path(), "OPTIONS short-circuit");
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

/// Method fallback for GET routes
pub async fn expect_get() -> ApiError {
    ApiError::MethodNotAllowed { allowed: "GET" }
}

/// Method fallback for POST routes
pub async fn expect_post() -> ApiError {
    ApiError::MethodNotAllowed { allowed: "POST" }
}

/// Router fallback
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "route",
        id: uri.path().to_owned(),
    }
}
