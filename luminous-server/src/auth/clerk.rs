//! Clerk session-token verification.
//!
//! Session tokens are RS256 JWTs. Signing keys come from Clerk's JWKS
//! endpoint (the Backend API one needs the secret key) and are cached
//! for `jwks_cache_ttl_secs`. An unknown `kid` triggers a refresh at most
//! once every 30 seconds.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use luminous_core::config::AuthSettings;
use luminous_core::ConfigError;

use super::{AuthError, Principal, TokenVerifier};

const BACKEND_API_JWKS: &str = "https://api.clerk.com/v1/jwks";

/// Unknown `kid`s never trigger more than one JWKS request per interval.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Last key set fetched from Clerk and when it was requested
#[derive(Debug, Default)]
struct KeyRing {
    keys: Option<Arc<JwkSet>>,
    fetched_at: Option<Instant>,
    requested_at: Option<Instant>,
}

impl KeyRing {
    fn fresh_key(&self, kid: &str, ttl: Duration) -> Option<Jwk> {
        let fetched_at = self.fetched_at?;
        if fetched_at.elapsed() >= ttl {
            return None;
        }
        self.keys.as_ref()?.find(kid).cloned()
    }

    fn requested_within(&self, interval: Duration) -> bool {
        self.requested_at.is_some_and(|at| at.elapsed() < interval)
    }
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    azp: Option<String>,
}

/// Verifies Clerk session JWTs against the instance JWKS
#[derive(Debug)]
pub struct ClerkVerifier {
    settings: AuthSettings,
    ring: RwLock<KeyRing>,
    refresh: Mutex<()>,
    min_refresh: Duration,
    http: Client,
}

impl ClerkVerifier {
    pub fn from_settings(settings: &AuthSettings, http: Client) -> Result<Self, ConfigError> {
        if settings.clerk_secret_key.is_none() && settings.jwks_url == BACKEND_API_JWKS {
            return Err(ConfigError::Missing {
                key: "CLERK_SECRET_KEY",
            });
        }
        Ok(Self {
            settings: settings.clone(),
            ring: RwLock::new(KeyRing::default()),
            refresh: Mutex::new(()),
            min_refresh: MIN_REFRESH_INTERVAL,
            http,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = vec![Algorithm::RS256];
        validation.leeway = self.settings.leeway_secs;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(iss) = self.settings.issuer.as_deref() {
            validation.set_issuer(&[iss]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        validation
    }

    fn check_party(&self, azp: Option<&str>) -> Result<(), AuthError> {
        let allowed = &self.settings.authorized_parties;
        if allowed.is_empty() {
            return Ok(());
        }
        match azp {
            Some(party) if allowed.iter().any(|a| a == party) => Ok(()),
            _ => Err(AuthError::UnauthorizedParty),
        }
    }

    /// Signing key for `kid`, refetching the JWKS when the cached set is
    /// stale or lacks it. Refreshes are serialized and rate limited.
    async fn signing_key(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        let ttl = Duration::from_secs(self.settings.jwks_cache_ttl_secs);
        if let Some(jwk) = self.ring.read().await.fresh_key(kid, ttl) {
            return Ok(Some(jwk));
        }

        let _refreshing = self.refresh.lock().await;
        {
            let ring = self.ring.read().await;
            if let Some(jwk) = ring.fresh_key(kid, ttl) {
                return Ok(Some(jwk));
            }
            if ring.requested_within(self.min_refresh) {
                tracing::debug!(kid, "JWKS refresh skipped, fetched recently");
                return match ring.keys.as_ref() {
                    Some(keys) => Ok(keys.find(kid).cloned()),
                    None => Err(AuthError::Upstream("JWKS unavailable".to_string())),
                };
            }
        }

        self.ring.write().await.requested_at = Some(Instant::now());
        let keys = Arc::new(self.fetch_jwks().await?);
        let jwk = keys.find(kid).cloned();

        let mut ring = self.ring.write().await;
        ring.keys = Some(keys);
        ring.fetched_at = Some(Instant::now());
        Ok(jwk)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let mut request = self.http.get(&self.settings.jwks_url);
        if let Some(secret) = self.settings.clerk_secret_key.as_deref() {
            request = request.bearer_auth(secret);
        }

        let set = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::Upstream(e.without_url().to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::Upstream(e.without_url().to_string()))?;

        tracing::debug!(keys = set.keys.len(), "Clerk JWKS fetched");
        Ok(set)
    }
}

#[async_trait]
impl TokenVerifier for ClerkVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let kid = header.kid.ok_or(AuthError::InvalidToken)?;

        let jwk = self.signing_key(&kid).await?.ok_or(AuthError::InvalidToken)?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|_| AuthError::InvalidToken)?;

        let claims = decode::<SessionClaims>(token, &key, &self.validation())
            .map(|t| t.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                AuthError::InvalidToken
            })?;

        self.check_party(claims.azp.as_deref())?;

        Ok(Principal {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::routing::get;
    use axum::{Json, Router};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tokio::task::JoinSet;

    use super::*;

    fn verifier(settings: AuthSettings) -> ClerkVerifier {
        ClerkVerifier::from_settings(&settings, Client::new()).unwrap()
    }

    /// Local JWKS endpoint with no keys, counting how often it is hit
    async fn empty_jwks_server() -> (String, Arc<AtomicUsize>) {
        async fn jwks(State(hits): State<Arc<AtomicUsize>>) -> Json<serde_json::Value> {
            hits.fetch_add(1, Ordering::SeqCst);
            Json(serde_json::json!({ "keys": [] }))
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/jwks", get(jwks))
            .with_state(Arc::clone(&hits));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{}/jwks", addr), hits)
    }

    fn token_with_kid(kid: &str) -> String {
        let header = Header {
            kid: Some(kid.to_string()),
            ..Header::new(Algorithm::HS256)
        };
        let claims = serde_json::json!({ "sub": "user_1", "exp": 4_000_000_000u64 });
        encode(&header, &claims, &EncodingKey::from_secret(b"not-clerk")).unwrap()
    }

    fn local_verifier(jwks_url: String) -> ClerkVerifier {
        verifier(AuthSettings {
            clerk_secret_key: Some("sk_test".into()),
            jwks_url,
            ..AuthSettings::default()
        })
    }

    #[tokio::test]
    async fn unknown_kids_share_one_jwks_fetch() {
        let (url, hits) = empty_jwks_server().await;
        let v = Arc::new(local_verifier(url));

        for i in 0..10 {
            let token = token_with_kid(&format!("seq-{}", i));
            assert!(matches!(v.verify(&token).await, Err(AuthError::InvalidToken)));
        }

        let mut tasks = JoinSet::new();
        for i in 0..10 {
            let v = Arc::clone(&v);
            tasks.spawn(async move { v.verify(&token_with_kid(&format!("par-{}", i))).await });
        }
        while let Some(result) = tasks.join_next().await {
            assert!(matches!(result.unwrap(), Err(AuthError::InvalidToken)));
        }

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refetches_once_the_interval_has_passed() {
        let (url, hits) = empty_jwks_server().await;
        let mut v = local_verifier(url);
        v.min_refresh = Duration::ZERO;

        for kid in ["a", "b", "c"] {
            assert!(matches!(v.verify(&token_with_kid(kid)).await, Err(AuthError::InvalidToken)));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backend_api_needs_secret_key() {
        let err =
            ClerkVerifier::from_settings(&AuthSettings::default(), Client::new()).unwrap_err();
        assert_eq!(err, ConfigError::Missing { key: "CLERK_SECRET_KEY" });
    }

    #[test]
    fn frontend_jwks_needs_no_secret() {
        let settings = AuthSettings {
            jwks_url: "https://clerk.example.dev/.well-known/jwks.json".into(),
            ..AuthSettings::default()
        };
        assert!(ClerkVerifier::from_settings(&settings, Client::new()).is_ok());
    }

    #[test]
    fn authorized_parties_are_enforced_when_set() {
        let open = verifier(AuthSettings {
            clerk_secret_key: Some("sk_test".into()),
            ..AuthSettings::default()
        });
        assert!(open.check_party(None).is_ok());

        let strict = verifier(AuthSettings {
            clerk_secret_key: Some("sk_test".into()),
            authorized_parties: vec!["https://luminous.example".into()],
            ..AuthSettings::default()
        });
        assert!(strict.check_party(Some("https://luminous.example")).is_ok());
        assert!(matches!(
            strict.check_party(Some("https://evil.example")),
            Err(AuthError::UnauthorizedParty)
        ));
        assert!(matches!(strict.check_party(None), Err(AuthError::UnauthorizedParty)));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid_without_network() {
        let v = verifier(AuthSettings {
            clerk_secret_key: Some("sk_test".into()),
            ..AuthSettings::default()
        });
        assert!(matches!(v.verify("not-a-jwt").await, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn validation_requires_issuer_when_configured() {
        let v = verifier(AuthSettings {
            clerk_secret_key: Some("sk_test".into()),
            issuer: Some("https://clerk.example.dev".into()),
            ..AuthSettings::default()
        });
        let validation = v.validation();
        assert!(validation.required_spec_claims.contains("iss"));
        assert!(validation.required_spec_claims.contains("exp"));
        assert_eq!(validation.algorithms, vec![Algorithm::RS256]);
    }
}
