//! Layered configuration: defaults, then `~/.luminous/config.toml`, then
//! environment variables.
//!
//! Every backend setting is optional here. A handler whose backend is not
//! configured answers with a configuration error at request time.

use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const REDACTED: &str = "********";

/// Centralized configuration for the API server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub postgres: PostgresSettings,
    pub libsql: LibsqlSettings,
    pub edge_config: EdgeConfigSettings,
    pub blob: BlobSettings,
    pub auth: AuthSettings,
    pub translation: TranslationSettings,
    pub metadata: MetadataSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// Allow any origin. Both front ends are served from other hosts,
    /// so this defaults to on.
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_permissive: true,
        }
    }
}

/// Postgres (Neon/Supabase) pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    pub url: Option<String>,
    /// Kept at one by default: many warm instances each hold a pool.
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 5,
        }
    }
}

/// LibSQL (Turso) settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibsqlSettings {
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

/// Vercel Edge Config connection string,
/// `https://edge-config.vercel.com/<id>?token=<token>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfigSettings {
    pub connection_string: Option<String>,
}

/// Vercel Blob store settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobSettings {
    /// Store base, e.g. `https://<store>.public.blob.vercel-storage.com`
    pub base_url: Option<String>,
    pub read_write_token: Option<String>,
}

/// Clerk session-token verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub clerk_secret_key: Option<String>,
    pub jwks_url: String,
    pub issuer: Option<String>,
    /// Accepted `azp` claims; empty accepts any
    pub authorized_parties: Vec<String>,
    pub jwks_cache_ttl_secs: u64,
    pub leeway_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            clerk_secret_key: None,
            jwks_url: "https://api.clerk.com/v1/jwks".to_string(),
            issuer: None,
            authorized_parties: Vec::new(),
            jwks_cache_ttl_secs: 300,
            leeway_secs: 5,
        }
    }
}

/// OpenRouter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
        }
    }
}

/// Backend selection for each metadata route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub v1: MetadataBackend,
    pub v2: MetadataBackend,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            v1: MetadataBackend::Postgres,
            v2: MetadataBackend::PostgresOrm,
        }
    }
}

/// Where metadata is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataBackend {
    /// Raw SQL with column-by-column row mapping
    Postgres,
    /// Typed row mapping over the same pool
    PostgresOrm,
    Libsql,
    EdgeConfig,
    Blob,
}

impl MetadataBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::PostgresOrm => "postgres-orm",
            Self::Libsql => "libsql",
            Self::EdgeConfig => "edge-config",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for MetadataBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "postgres" => Ok(Self::Postgres),
            "postgres-orm" => Ok(Self::PostgresOrm),
            "libsql" => Ok(Self::Libsql),
            "edge-config" => Ok(Self::EdgeConfig),
            "blob" => Ok(Self::Blob),
            other => Err(format!(
                "unknown backend '{}' \
                 (expected postgres, postgres-orm, libsql, edge-config or blob)",
                other
            )),
        }
    }
}

impl Settings {
    /// Load defaults, the config file if present, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        let base = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Config file path: `$LUMINOUS_CONFIG` or `~/.luminous/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("LUMINOUS_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".luminous/config.toml")
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides through `lookup`. Empty values count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LUMINOUS_BIND") {
            self.server.bind_addr = parse_key("LUMINOUS_BIND", &v)?;
        }
        if let Some(v) = get("LUMINOUS_CORS_PERMISSIVE") {
            self.server.cors_permissive = parse_bool("LUMINOUS_CORS_PERMISSIVE", &v)?;
        }

        if let Some(v) = get("DATABASE_URL") {
            self.postgres.url = Some(v);
        }
        if let Some(v) = get("LUMINOUS_POOL_MAX") {
            let max: u32 = parse_key("LUMINOUS_POOL_MAX", &v)?;
            if max == 0 {
                return Err(ConfigError::invalid("LUMINOUS_POOL_MAX", "must be at least 1"));
            }
            self.postgres.max_connections = max;
        }
        if let Some(v) = get("LUMINOUS_POOL_ACQUIRE_TIMEOUT_SECS") {
            self.postgres.acquire_timeout_secs =
                parse_key("LUMINOUS_POOL_ACQUIRE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("LUMINOUS_POOL_IDLE_TIMEOUT_SECS") {
            self.postgres.idle_timeout_secs = parse_key("LUMINOUS_POOL_IDLE_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = get("TURSO_DATABASE_URL") {
            self.libsql.url = Some(v);
        }
        if let Some(v) = get("TURSO_AUTH_TOKEN") {
            self.libsql.auth_token = Some(v);
        }

        if let Some(v) = get("EDGE_CONFIG") {
            self.edge_config.connection_string = Some(v);
        }

        if let Some(v) = get("BLOB_BASE_URL") {
            self.blob.base_url = Some(v);
        }
        if let Some(v) = get("BLOB_READ_WRITE_TOKEN") {
            self.blob.read_write_token = Some(v);
        }

        if let Some(v) = get("CLERK_SECRET_KEY") {
            self.auth.clerk_secret_key = Some(v);
        }
        if let Some(v) = get("CLERK_JWKS_URL") {
            self.auth.jwks_url = v;
        }
        if let Some(v) = get("CLERK_ISSUER") {
            self.auth.issuer = Some(v);
        }
        if let Some(v) = get("CLERK_AUTHORIZED_PARTIES") {
            self.auth.authorized_parties = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }

        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.translation.api_key = Some(v);
        }
        if let Some(v) = get("OPENROUTER_MODEL") {
            self.translation.model = v;
        }
        if let Some(v) = get("OPENROUTER_BASE_URL") {
            self.translation.base_url = v;
        }

        if let Some(v) = get("LUMINOUS_METADATA_V1") {
            self.metadata.v1 = v
                .parse()
                .map_err(|reason| ConfigError::Invalid { key: "LUMINOUS_METADATA_V1", reason })?;
        }
        if let Some(v) = get("LUMINOUS_METADATA_V2") {
            self.metadata.v2 = v
                .parse()
                .map_err(|reason| ConfigError::Invalid { key: "LUMINOUS_METADATA_V2", reason })?;
        }

        Ok(self)
    }

    /// Copy with every secret replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut s = self.clone();
        let hide = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some(REDACTED.to_string());
            }
        };
        hide(&mut s.postgres.url);
        hide(&mut s.libsql.auth_token);
        hide(&mut s.edge_config.connection_string);
        hide(&mut s.blob.read_write_token);
        hide(&mut s.auth.clerk_secret_key);
        hide(&mut s.translation.api_key);
        s
    }
}

fn parse_key<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string()))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("'{}' is not a boolean", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_cap_pool_at_one() {
        let s = Settings::default();
        assert_eq!(s.postgres.max_connections, 1);
        assert_eq!(s.postgres.acquire_timeout_secs, 5);
        assert!(s.postgres.url.is_none());
        assert_eq!(s.metadata.v1, MetadataBackend::Postgres);
        assert_eq!(s.metadata.v2, MetadataBackend::PostgresOrm);
        assert!(s.server.cors_permissive);
    }

    #[test]
    fn env_overrides_apply() {
        let s = Settings::default()
            .with_env(env(&[
                ("DATABASE_URL", "postgres://neon/quran"),
                ("LUMINOUS_POOL_MAX", "2"),
                ("LUMINOUS_METADATA_V2", "edge-config"),
                ("CLERK_AUTHORIZED_PARTIES", "https://a.example, https://b.example,"),
                ("LUMINOUS_BIND", "0.0.0.0:8080"),
            ]))
            .unwrap();

        assert_eq!(s.postgres.url.as_deref(), Some("postgres://neon/quran"));
        assert_eq!(s.postgres.max_connections, 2);
        assert_eq!(s.metadata.v2, MetadataBackend::EdgeConfig);
        assert_eq!(s.auth.authorized_parties.len(), 2);
        assert_eq!(s.server.bind_addr.port(), 8080);
    }

    #[test]
    fn empty_env_values_are_unset() {
        let s = Settings::default()
            .with_env(env(&[("DATABASE_URL", "  "), ("OPENROUTER_API_KEY", "")]))
            .unwrap();
        assert!(s.postgres.url.is_none());
        assert!(s.translation.api_key.is_none());
    }

    #[test]
    fn malformed_env_values_are_rejected() {
        let err = Settings::default()
            .with_env(env(&[("LUMINOUS_POOL_MAX", "many")]))
            .unwrap_err();
        assert_eq!(err.key(), Some("LUMINOUS_POOL_MAX"));

        let err = Settings::default()
            .with_env(env(&[("LUMINOUS_POOL_MAX", "0")]))
            .unwrap_err();
        assert_eq!(err.key(), Some("LUMINOUS_POOL_MAX"));

        let err = Settings::default()
            .with_env(env(&[("LUMINOUS_METADATA_V1", "prisma")]))
            .unwrap_err();
        assert_eq!(err.key(), Some("LUMINOUS_METADATA_V1"));
    }

    #[test]
    fn file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [postgres]
            url = "postgres://file/quran"
            max_connections = 3

            [metadata]
            v1 = "libsql"
            "#,
        )
        .unwrap();

        let s = Settings::from_file(&path)
            .unwrap()
            .with_env(env(&[("DATABASE_URL", "postgres://env/quran")]))
            .unwrap();

        assert_eq!(s.postgres.url.as_deref(), Some("postgres://env/quran"));
        assert_eq!(s.postgres.max_connections, 3);
        // Unset sections keep their defaults
        assert_eq!(s.postgres.idle_timeout_secs, 5);
        assert_eq!(s.metadata.v1, MetadataBackend::Libsql);
        assert_eq!(s.metadata.v2, MetadataBackend::PostgresOrm);
    }

    #[test]
    fn bad_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "postgres = [").unwrap();
        assert!(matches!(
            Settings::from_file(&path),
            Err(ConfigError::File { .. })
        ));
    }

    #[test]
    fn redaction_hides_secrets_only() {
        let s = Settings::default()
            .with_env(env(&[
                ("DATABASE_URL", "postgres://user:pw@host/db"),
                ("OPENROUTER_API_KEY", "sk-or-secret"),
            ]))
            .unwrap()
            .redacted();
        assert_eq!(s.postgres.url.as_deref(), Some(REDACTED));
        assert_eq!(s.translation.api_key.as_deref(), Some(REDACTED));
        assert!(s.auth.clerk_secret_key.is_none());
        assert_eq!(s.translation.model, "openai/gpt-4o-mini");
    }
}
