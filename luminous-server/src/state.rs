//! Application state shared across handlers
//!
//! Backends whose settings are missing are replaced by [`Unconfigured`],
//! so the server still starts and the affected routes answer 500.

use std::sync::Arc;

use luminous_core::{ConfigError, MetadataBackend, Settings};

use crate::auth::{ClerkVerifier, TokenVerifier};
use crate::clients::{
    http_client, BlobClient, EdgeConfigClient, LibsqlBibleStore, LibsqlClient, LibsqlMetadata,
    OpenRouterTranslator,
};
use crate::db::pool::{LazyPool, PoolSnapshot, PoolStats};
use crate::db::repos::{OrmMetadata, QuranRepo, SqlMetadata};
use crate::store::{
    BibleStore, KeyValueMetadata, KeyValueStore, MetadataSource, QuranStore, Unconfigured,
};
use crate::translate::Translator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    quran: Arc<dyn QuranStore>,
    metadata_v1: Arc<dyn MetadataSource>,
    metadata_v2: Arc<dyn MetadataSource>,
    edge: Arc<dyn KeyValueStore>,
    bible: Arc<dyn BibleStore>,
    verifier: Arc<dyn TokenVerifier>,
    translator: Arc<dyn Translator>,
    pool: Option<Arc<LazyPool>>,
    stats: Arc<PoolStats>,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Wire every backend from settings. Never fails; see module docs.
    pub fn from_settings(settings: &Settings) -> Self {
        let http = http_client();
        let pool = Arc::new(LazyPool::new(settings.postgres.clone()));

        let edge: Arc<dyn KeyValueStore> =
            match EdgeConfigClient::from_settings(&settings.edge_config, http.clone()) {
                Ok(client) => Arc::new(client),
                Err(err) => unconfigured("edge-config", err),
            };

        let bible: Arc<dyn BibleStore> =
            match LibsqlClient::from_settings(&settings.libsql, http.clone()) {
                Ok(client) => Arc::new(LibsqlBibleStore::new(client)),
                Err(err) => unconfigured("libsql", err),
            };

        let verifier: Arc<dyn TokenVerifier> =
            match ClerkVerifier::from_settings(&settings.auth, http.clone()) {
                Ok(v) => Arc::new(v),
                Err(err) => unconfigured("clerk", err),
            };

        let translator: Arc<dyn Translator> =
            match OpenRouterTranslator::from_settings(&settings.translation, http.clone()) {
                Ok(t) => Arc::new(t),
                Err(err) => unconfigured("openrouter", err),
            };

        let metadata_v1 = metadata_source(settings.metadata.v1, settings, &pool, &edge);
        let metadata_v2 = metadata_source(settings.metadata.v2, settings, &pool, &edge);
        tracing::info!(
            v1 = metadata_v1.backend(),
            v2 = metadata_v2.backend(),
            pool_configured = pool.is_configured(),
            "Backends wired"
        );

        Self::builder()
            .quran(Arc::new(QuranRepo::new(Arc::clone(&pool))))
            .metadata_v1(metadata_v1)
            .metadata_v2(metadata_v2)
            .edge(edge)
            .bible(bible)
            .verifier(verifier)
            .translator(translator)
            .pool(pool)
            .build()
    }

    pub fn quran(&self) -> &dyn QuranStore {
        self.inner.quran.as_ref()
    }

    pub fn metadata_v1(&self) -> &dyn MetadataSource {
        self.inner.metadata_v1.as_ref()
    }

    pub fn metadata_v2(&self) -> &dyn MetadataSource {
        self.inner.metadata_v2.as_ref()
    }

    pub fn edge(&self) -> &dyn KeyValueStore {
        self.inner.edge.as_ref()
    }

    pub fn bible(&self) -> &dyn BibleStore {
        self.inner.bible.as_ref()
    }

    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.inner.verifier.as_ref()
    }

    pub fn translator(&self) -> &dyn Translator {
        self.inner.translator.as_ref()
    }

    pub fn pool(&self) -> Option<&LazyPool> {
        self.inner.pool.as_deref()
    }

    pub fn pool_snapshot(&self) -> PoolSnapshot {
        self.inner.stats.snapshot()
    }

    /// Close the Postgres pool if one was opened.
    pub async fn close(&self) {
        if let Some(pool) = self.pool() {
            pool.close().await;
        }
    }
}

fn unconfigured(backend: &'static str, err: ConfigError) -> Arc<Unconfigured> {
    tracing::warn!(backend, error = %err, "Backend not configured; its routes will fail");
    Arc::new(Unconfigured(err))
}

fn metadata_source(
    backend: MetadataBackend,
    settings: &Settings,
    pool: &Arc<LazyPool>,
    edge: &Arc<dyn KeyValueStore>,
) -> Arc<dyn MetadataSource> {
    match backend {
        MetadataBackend::Postgres => Arc::new(SqlMetadata::new(Arc::clone(pool))),
        MetadataBackend::PostgresOrm => Arc::new(OrmMetadata::new(Arc::clone(pool))),
        MetadataBackend::Libsql => {
            match LibsqlClient::from_settings(&settings.libsql, http_client()) {
                Ok(client) => Arc::new(LibsqlMetadata::new(client)),
                Err(err) => unconfigured("libsql", err),
            }
        }
        MetadataBackend::EdgeConfig => Arc::new(KeyValueMetadata::edge_config(Arc::clone(edge))),
        MetadataBackend::Blob => match BlobClient::from_settings(&settings.blob, http_client()) {
            Ok(client) => Arc::new(KeyValueMetadata::blob(Arc::new(client))),
            Err(err) => unconfigured("blob", err),
        },
    }
}

/// Builder for [`AppState`]; unset backends are [`Unconfigured`].
pub struct AppStateBuilder {
    quran: Arc<dyn QuranStore>,
    metadata_v1: Arc<dyn MetadataSource>,
    metadata_v2: Arc<dyn MetadataSource>,
    edge: Arc<dyn KeyValueStore>,
    bible: Arc<dyn BibleStore>,
    verifier: Arc<dyn TokenVerifier>,
    translator: Arc<dyn Translator>,
    pool: Option<Arc<LazyPool>>,
    stats: Option<Arc<PoolStats>>,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self {
            quran: Arc::new(Unconfigured::missing("DATABASE_URL")),
            metadata_v1: Arc::new(Unconfigured::missing("DATABASE_URL")),
            metadata_v2: Arc::new(Unconfigured::missing("DATABASE_URL")),
            edge: Arc::new(Unconfigured::missing("EDGE_CONFIG")),
            bible: Arc::new(Unconfigured::missing("TURSO_DATABASE_URL")),
            verifier: Arc::new(Unconfigured::missing("CLERK_SECRET_KEY")),
            translator: Arc::new(Unconfigured::missing("OPENROUTER_API_KEY")),
            pool: None,
            stats: None,
        }
    }
}

impl AppStateBuilder {
    pub fn quran(mut self, store: Arc<dyn QuranStore>) -> Self {
        self.quran = store;
        self
    }

    pub fn metadata_v1(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.metadata_v1 = source;
        self
    }

    pub fn metadata_v2(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.metadata_v2 = source;
        self
    }

    pub fn edge(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.edge = store;
        self
    }

    pub fn bible(mut self, store: Arc<dyn BibleStore>) -> Self {
        self.bible = store;
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Postgres pool; its counters become the health snapshot.
    pub fn pool(mut self, pool: Arc<LazyPool>) -> Self {
        self.stats = Some(pool.stats());
        self.pool = Some(pool);
        self
    }

    /// Counters reported by `/health` when no pool is set.
    pub fn stats(mut self, stats: Arc<PoolStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn build(self) -> AppState {
        AppState {
            inner: Arc::new(AppStateInner {
                quran: self.quran,
                metadata_v1: self.metadata_v1,
                metadata_v2: self.metadata_v2,
                edge: self.edge,
                bible: self.bible,
                verifier: self.verifier,
                translator: self.translator,
                pool: self.pool,
                stats: self.stats.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use luminous_core::{MetadataKind, SurahNumber};

    #[tokio::test]
    async fn default_settings_fail_closed_per_backend() {
        let state = AppState::from_settings(&Settings::default());
        let surah = SurahNumber::new("surah", 1).unwrap();

        let err = state.quran().verses(surah).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::Missing { key: "DATABASE_URL" })
        ));

        let err = state.edge().item("quranMetadata").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::Missing { key: "EDGE_CONFIG" })
        ));
        assert_eq!(state.pool_snapshot().acquired, 0);
    }

    #[test]
    fn configured_backends_are_selected() {
        let mut settings = Settings::default();
        settings.metadata.v1 = MetadataBackend::EdgeConfig;
        settings.metadata.v2 = MetadataBackend::Blob;
        settings.blob.base_url = Some("https://store.example/".into());

        let state = AppState::from_settings(&settings);
        assert_eq!(state.metadata_v1().backend(), "edge-config");
        assert_eq!(state.metadata_v2().backend(), "blob");
    }

    #[tokio::test]
    async fn missing_blob_url_is_reported_on_fetch() {
        let mut settings = Settings::default();
        settings.metadata.v2 = MetadataBackend::Blob;

        let state = AppState::from_settings(&settings);
        let err = state.metadata_v2().fetch(MetadataKind::Sajdas).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::Missing { key: "BLOB_BASE_URL" })
        ));
    }
}
