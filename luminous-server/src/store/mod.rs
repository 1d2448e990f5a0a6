//! Data-access seams shared by every route
//!
//! Handlers only see these traits. Postgres, LibSQL, Edge Config and Blob
//! implementations live in `db` and `clients`; `memory` backs the tests.

pub mod keyvalue;
pub mod memory;

use async_trait::async_trait;
use luminous_core::{
    AyahNumber, BibleVerse, ConfigError, MetadataKind, MetadataPayload, SurahDescription,
    SurahNumber, TranslatedVerse, TranslatorKey, Verse,
};
use serde_json::Value;

pub use keyvalue::KeyValueMetadata;
pub use memory::MemoryStore;

/// Datastore error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("libsql error: {message}")]
    Libsql {
        message: String,
        code: Option<String>,
    },

    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("unexpected {resource} row: {reason}")]
    Decode {
        resource: &'static str,
        reason: String,
    },
}

impl StoreError {
    /// Driver-reported error code (SQLSTATE for Postgres), if any.
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Sqlx(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
            Self::Libsql { code, .. } => code.clone(),
            _ => None,
        }
    }
}

/// Narrow a stored integer into a DTO field type.
pub(crate) fn narrow<T>(
    resource: &'static str,
    column: &'static str,
    value: impl Into<i64>,
) -> Result<T, StoreError>
where
    T: TryFrom<i64>,
{
    let value = value.into();
    T::try_from(value).map_err(|_| StoreError::Decode {
        resource,
        reason: format!("{} out of range: {}", column, value),
    })
}

/// Quran verse and description lookups
#[async_trait]
pub trait QuranStore: Send + Sync {
    async fn verse(
        &self,
        surah: SurahNumber,
        ayah: AyahNumber,
    ) -> Result<Option<Verse>, StoreError>;

    /// All verses of a surah, ascending by verse number.
    async fn verses(&self, surah: SurahNumber) -> Result<Vec<Verse>, StoreError>;

    /// Translated verses of a surah, ascending by verse number.
    async fn translation_verses(
        &self,
        surah: SurahNumber,
        translator: TranslatorKey,
    ) -> Result<Vec<TranslatedVerse>, StoreError>;

    async fn surah_description(
        &self,
        surah: SurahNumber,
    ) -> Result<Option<SurahDescription>, StoreError>;
}

/// "Fetch metadata by type", whichever backend holds it
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Backend name for logs
    fn backend(&self) -> &'static str;

    async fn fetch(&self, kind: MetadataKind) -> Result<MetadataPayload, StoreError>;
}

/// Read-only JSON documents by key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn item(&self, key: &str) -> Result<Option<Value>, StoreError>;
}

/// Bible chapter lookups
#[async_trait]
pub trait BibleStore: Send + Sync {
    /// Verses of one chapter, ascending by verse number.
    async fn chapter(&self, bible_id: &str, chapter_id: &str)
        -> Result<Vec<BibleVerse>, StoreError>;
}

/// Stand-in for a backend whose settings are missing or invalid.
///
/// Every call fails with the configuration error it was built from.
#[derive(Debug, Clone)]
pub struct Unconfigured(pub ConfigError);

impl Unconfigured {
    pub fn missing(key: &'static str) -> Self {
        Self(ConfigError::Missing { key })
    }

    fn err<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Config(self.0.clone()))
    }
}

#[async_trait]
impl QuranStore for Unconfigured {
    async fn verse(&self, _: SurahNumber, _: AyahNumber) -> Result<Option<Verse>, StoreError> {
        self.err()
    }

    async fn verses(&self, _: SurahNumber) -> Result<Vec<Verse>, StoreError> {
        self.err()
    }

    async fn translation_verses(
        &self,
        _: SurahNumber,
        _: TranslatorKey,
    ) -> Result<Vec<TranslatedVerse>, StoreError> {
        self.err()
    }

    async fn surah_description(
        &self,
        _: SurahNumber,
    ) -> Result<Option<SurahDescription>, StoreError> {
        self.err()
    }
}

#[async_trait]
impl MetadataSource for Unconfigured {
    fn backend(&self) -> &'static str {
        "unconfigured"
    }

    async fn fetch(&self, _: MetadataKind) -> Result<MetadataPayload, StoreError> {
        self.err()
    }
}

#[async_trait]
impl KeyValueStore for Unconfigured {
    async fn item(&self, _: &str) -> Result<Option<Value>, StoreError> {
        self.err()
    }
}

#[async_trait]
impl BibleStore for Unconfigured {
    async fn chapter(&self, _: &str, _: &str) -> Result<Vec<BibleVerse>, StoreError> {
        self.err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_rejects_overflow() {
        let ok: u16 = narrow("surah", "number", 114_i32).unwrap();
        assert_eq!(ok, 114);

        let err = narrow::<u16>("surah", "number", 70_000_i64).unwrap_err();
        assert!(err.to_string().contains("number out of range"));

        assert!(narrow::<u32>("verse", "verse_number", -1_i32).is_err());
    }

    #[tokio::test]
    async fn unconfigured_reports_its_key() {
        let store = Unconfigured::missing("TURSO_DATABASE_URL");
        let err = BibleStore::chapter(&store, "b", "JHN.3").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::Missing {
                key: "TURSO_DATABASE_URL"
            })
        ));
    }

    #[test]
    fn only_driver_errors_carry_codes() {
        let err = StoreError::Libsql {
            message: "no such table".into(),
            code: Some("SQLITE_ERROR".into()),
        };
        assert_eq!(err.code().as_deref(), Some("SQLITE_ERROR"));

        let err = StoreError::NotFound {
            resource: "verse",
            id: "2:1000000".into(),
        };
        assert!(err.code().is_none());
    }
}
