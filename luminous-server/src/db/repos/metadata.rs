//! Metadata repositories over Postgres
//!
//! Two readers of the same tables:
//! - `SqlMetadata` maps columns by hand from untyped rows
//! - `OrmMetadata` lets `FromRow` derive the mapping
//!
//! Both end in the same `TryFrom` conversions, so the JSON they produce
//! is identical.

use std::sync::Arc;

use async_trait::async_trait;
use luminous_core::{MetadataKind, MetadataPayload, RevelationType, Sajda, Surah};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::db::pool::LazyPool;
use crate::store::{narrow, MetadataSource, StoreError};

pub(crate) const SURAH_LIST_SQL: &str = r#"
    SELECT number, arabic_name, transliteration, english_name, ayah_count,
           revelation_type, chronological_order, rukus
    FROM quran_surahs
    ORDER BY number ASC
"#;

pub(crate) const SAJDAS_SQL: &str = r#"
    SELECT surah_number, ayah_number, sajda_type
    FROM quran_sajdas
    ORDER BY surah_number ASC, ayah_number ASC
"#;

/// `quran_surahs` row
#[derive(Debug, Clone, FromRow)]
pub struct SurahRow {
    pub number: i32,
    pub arabic_name: String,
    pub transliteration: String,
    pub english_name: String,
    pub ayah_count: i32,
    pub revelation_type: String,
    pub chronological_order: i32,
    pub rukus: i32,
}

/// `quran_sajdas` row
#[derive(Debug, Clone, FromRow)]
pub struct SajdaRow {
    pub surah_number: i32,
    pub ayah_number: i32,
    pub sajda_type: String,
}

impl TryFrom<SurahRow> for Surah {
    type Error = StoreError;

    fn try_from(r: SurahRow) -> Result<Self, Self::Error> {
        let revelation_type =
            RevelationType::parse(&r.revelation_type).map_err(|e| StoreError::Decode {
                resource: "surah",
                reason: e.to_string(),
            })?;
        Ok(Surah {
            number: narrow("surah", "number", r.number)?,
            arabic_name: r.arabic_name,
            transliteration: r.transliteration,
            english_name: r.english_name,
            ayah_count: narrow("surah", "ayah_count", r.ayah_count)?,
            revelation_type,
            chronological_order: narrow("surah", "chronological_order", r.chronological_order)?,
            rukus: narrow("surah", "rukus", r.rukus)?,
        })
    }
}

impl TryFrom<SajdaRow> for Sajda {
    type Error = StoreError;

    fn try_from(r: SajdaRow) -> Result<Self, Self::Error> {
        Ok(Sajda {
            surah_number: narrow("sajda", "surah_number", r.surah_number)?,
            ayah_number: narrow("sajda", "ayah_number", r.ayah_number)?,
            kind: r.sajda_type,
        })
    }
}

/// Convert every row, failing on the first bad one so no partial list is returned.
fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Raw-SQL metadata reader
pub struct SqlMetadata {
    pool: Arc<LazyPool>,
}

impl SqlMetadata {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self { pool }
    }
}

fn surah_row(row: &PgRow) -> Result<SurahRow, sqlx::Error> {
    Ok(SurahRow {
        number: row.try_get("number")?,
        arabic_name: row.try_get("arabic_name")?,
        transliteration: row.try_get("transliteration")?,
        english_name: row.try_get("english_name")?,
        ayah_count: row.try_get("ayah_count")?,
        revelation_type: row.try_get("revelation_type")?,
        chronological_order: row.try_get("chronological_order")?,
        rukus: row.try_get("rukus")?,
    })
}

fn sajda_row(row: &PgRow) -> Result<SajdaRow, sqlx::Error> {
    Ok(SajdaRow {
        surah_number: row.try_get("surah_number")?,
        ayah_number: row.try_get("ayah_number")?,
        sajda_type: row.try_get("sajda_type")?,
    })
}

#[async_trait]
impl MetadataSource for SqlMetadata {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn fetch(&self, kind: MetadataKind) -> Result<MetadataPayload, StoreError> {
        let mut lease = self.pool.lease().await?;
        match kind {
            MetadataKind::SurahList => {
                let rows = sqlx::query(SURAH_LIST_SQL).fetch_all(&mut **lease).await?;
                let rows = rows.iter().map(surah_row).collect::<Result<Vec<_>, _>>()?;
                Ok(MetadataPayload::Surahs(convert_all(rows)?))
            }
            MetadataKind::Sajdas => {
                let rows = sqlx::query(SAJDAS_SQL).fetch_all(&mut **lease).await?;
                let rows = rows.iter().map(sajda_row).collect::<Result<Vec<_>, _>>()?;
                Ok(MetadataPayload::Sajdas(convert_all(rows)?))
            }
            MetadataKind::NavigationIndices => Err(StoreError::NotFound {
                resource: "metadata",
                id: kind.as_str().to_owned(),
            }),
        }
    }
}

/// Typed-row metadata reader
pub struct OrmMetadata {
    pool: Arc<LazyPool>,
}

impl OrmMetadata {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataSource for OrmMetadata {
    fn backend(&self) -> &'static str {
        "postgres-orm"
    }

    async fn fetch(&self, kind: MetadataKind) -> Result<MetadataPayload, StoreError> {
        let mut lease = self.pool.lease().await?;
        match kind {
            MetadataKind::SurahList => {
                let rows = sqlx::query_as::<_, SurahRow>(SURAH_LIST_SQL)
                    .fetch_all(&mut **lease)
                    .await?;
                Ok(MetadataPayload::Surahs(convert_all(rows)?))
            }
            MetadataKind::Sajdas => {
                let rows = sqlx::query_as::<_, SajdaRow>(SAJDAS_SQL)
                    .fetch_all(&mut **lease)
                    .await?;
                Ok(MetadataPayload::Sajdas(convert_all(rows)?))
            }
            MetadataKind::NavigationIndices => Err(StoreError::NotFound {
                resource: "metadata",
                id: kind.as_str().to_owned(),
            }),
        }
    }
}
