//! Database connection pool management
//!
//! One `LazyPool` per process, owned by `AppState`. The sqlx pool is opened
//! on first use and reused while the process stays warm. Every checkout is a
//! [`Lease`], and [`PoolStats`] counts acquisitions and releases.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use luminous_core::config::PostgresSettings;
use luminous_core::ConfigError;
use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use tokio::sync::OnceCell;

use crate::store::StoreError;

/// Acquisition and release counters
#[derive(Debug, Default)]
pub struct PoolStats {
    acquired: AtomicU64,
    released: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub acquired: u64,
    pub released: u64,
    pub in_use: u64,
}

impl PoolStats {
    /// Wrap a checked-out connection. The release is counted when the
    /// lease drops, whichever way the caller exits.
    pub fn lease<C>(self: &Arc<Self>, conn: C) -> Lease<C> {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        Lease {
            conn,
            stats: Arc::clone(self),
        }
    }

    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        // Read released first so in_use never underflows mid-update
        let released = self.released();
        let acquired = self.acquired();
        PoolSnapshot {
            acquired,
            released,
            in_use: acquired.saturating_sub(released),
        }
    }
}

/// A checked-out connection
pub struct Lease<C> {
    conn: C,
    stats: Arc<PoolStats>,
}

impl<C> Deref for Lease<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.conn
    }
}

impl<C> DerefMut for Lease<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.conn
    }
}

impl<C> Drop for Lease<C> {
    fn drop(&mut self) {
        // `conn` drops right after this, returning it to the sqlx pool
        self.stats.released.fetch_add(1, Ordering::Relaxed);
    }
}

/// Postgres lease
pub type PgLease = Lease<PoolConnection<Postgres>>;

/// Process-wide Postgres pool, opened on first use
pub struct LazyPool {
    settings: PostgresSettings,
    pool: OnceCell<PgPool>,
    stats: Arc<PoolStats>,
}

impl LazyPool {
    pub fn new(settings: PostgresSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new(),
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_configured(&self) -> bool {
        self.settings.url.is_some()
    }

    /// The underlying pool, connecting on first call.
    ///
    /// A failed connect is not cached; the next request tries again.
    pub async fn pool(&self) -> Result<&PgPool, StoreError> {
        let url = self
            .settings
            .url
            .as_deref()
            .ok_or(ConfigError::Missing {
                key: "DATABASE_URL",
            })?;

        let pool = self
            .pool
            .get_or_try_init(|| async {
                tracing::info!(
                    max_connections = self.settings.max_connections,
                    acquire_timeout_secs = self.settings.acquire_timeout_secs,
                    idle_timeout_secs = self.settings.idle_timeout_secs,
                    "Opening Postgres pool"
                );
                self.options().connect(url).await
            })
            .await?;
        Ok(pool)
    }

    /// Check out one connection.
    pub async fn lease(&self) -> Result<PgLease, StoreError> {
        let conn = self.pool().await?.acquire().await?;
        Ok(self.stats.lease(conn))
    }

    /// Close the pool if it was ever opened.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("Postgres pool closed");
        }
    }

    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .acquire_timeout(Duration::from_secs(self.settings.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.settings.idle_timeout_secs))
    }
}
