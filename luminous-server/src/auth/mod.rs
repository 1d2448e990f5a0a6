//! Bearer-token authentication
//!
//! `require_auth` runs ahead of the protected route's method and body
//! checks. A request that fails here never reaches the handler.

pub mod clerk;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use luminous_core::ConfigError;

use crate::http::error::ApiError;
use crate::state::AppState;
use crate::store::Unconfigured;

pub use clerk::ClerkVerifier;

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub session_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token issued for an unauthorized party")]
    UnauthorizedParty,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("auth provider unavailable: {0}")]
    Upstream(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

#[async_trait]
impl TokenVerifier for Unconfigured {
    async fn verify(&self, _: &str) -> Result<Principal, AuthError> {
        Err(AuthError::Config(self.0.clone()))
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Middleware: verify the bearer token and attach the [`Principal`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let principal = state.verifier().verify(token).await?;
    tracing::debug!(user_id = %principal.user_id, "request authenticated");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            bearer_token(&headers("Basic dXNlcjpwdw==")),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(bearer_token(&headers("Bearer")), Err(AuthError::InvalidToken)));
        assert!(matches!(bearer_token(&headers("Bearer   ")), Err(AuthError::MissingToken)));
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        ));
    }
}
