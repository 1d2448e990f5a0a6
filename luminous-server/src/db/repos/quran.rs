//! Quran repository
//!
//! One lease, one statement per call:
//! - verse / verses / translation_verses: plain SELECT, ordered by verse number
//! - upsert_description: INSERT ... ON CONFLICT (last write wins)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use luminous_core::{
    AyahNumber, SurahDescription, SurahNumber, TranslatedVerse, TranslatorKey, Verse,
};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::pool::LazyPool;
use crate::store::{narrow, QuranStore, StoreError};

/// Quran repository over the shared pool
pub struct QuranRepo {
    pool: Arc<LazyPool>,
}

impl QuranRepo {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self { pool }
    }

    /// Create or overwrite a surah description.
    pub async fn upsert_description(
        &self,
        surah: SurahNumber,
        description: &str,
    ) -> Result<SurahDescription, StoreError> {
        let mut lease = self.pool.lease().await?;
        let row = sqlx::query(
            r#"
            INSERT INTO surah_descriptions (surah_id, description, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (surah_id) DO UPDATE
                SET description = EXCLUDED.description,
                    updated_at = EXCLUDED.updated_at
            RETURNING surah_id, description, updated_at
            "#,
        )
        .bind(surah.as_i32())
        .bind(description)
        .fetch_one(&mut **lease)
        .await?;

        description_from_row(&row)
    }
}

fn verse_from_row(row: &PgRow) -> Result<Verse, StoreError> {
    Ok(Verse {
        id: row.try_get("id")?,
        surah_id: narrow("verse", "surah_id", row.try_get::<i32, _>("surah_id")?)?,
        verse_number: narrow("verse", "verse_number", row.try_get::<i32, _>("verse_number")?)?,
        text: row.try_get("text")?,
    })
}

fn translated_from_row(
    row: &PgRow,
    translator: TranslatorKey,
) -> Result<TranslatedVerse, StoreError> {
    Ok(TranslatedVerse {
        id: row.try_get("id")?,
        surah_id: narrow("translation", "surah_id", row.try_get::<i32, _>("surah_id")?)?,
        verse_number: narrow(
            "translation",
            "verse_number",
            row.try_get::<i32, _>("verse_number")?,
        )?,
        translation: row.try_get("text")?,
        translator: translator.as_str().to_owned(),
    })
}

fn description_from_row(row: &PgRow) -> Result<SurahDescription, StoreError> {
    Ok(SurahDescription {
        surah_id: narrow("description", "surah_id", row.try_get::<i32, _>("surah_id")?)?,
        description: row.try_get("description")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl QuranStore for QuranRepo {
    async fn verse(
        &self,
        surah: SurahNumber,
        ayah: AyahNumber,
    ) -> Result<Option<Verse>, StoreError> {
        let mut lease = self.pool.lease().await?;
        let row = sqlx::query(
            r#"
            SELECT id, surah_id, verse_number, text
            FROM quran_verses
            WHERE surah_id = $1 AND verse_number = $2
            "#,
        )
        .bind(surah.as_i32())
        .bind(ayah.as_i32())
        .fetch_optional(&mut **lease)
        .await?;

        row.as_ref().map(verse_from_row).transpose()
    }

    async fn verses(&self, surah: SurahNumber) -> Result<Vec<Verse>, StoreError> {
        let mut lease = self.pool.lease().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, surah_id, verse_number, text
            FROM quran_verses
            WHERE surah_id = $1
            ORDER BY verse_number ASC
            "#,
        )
        .bind(surah.as_i32())
        .fetch_all(&mut **lease)
        .await?;

        rows.iter().map(verse_from_row).collect()
    }

    async fn translation_verses(
        &self,
        surah: SurahNumber,
        translator: TranslatorKey,
    ) -> Result<Vec<TranslatedVerse>, StoreError> {
        let mut lease = self.pool.lease().await?;
        let rows = sqlx::query(
            r#"
            SELECT id, surah_id, verse_number, text
            FROM quran_translations
            WHERE translator = $1 AND surah_id = $2
            ORDER BY verse_number ASC
            "#,
        )
        .bind(translator.as_str())
        .bind(surah.as_i32())
        .fetch_all(&mut **lease)
        .await?;

        rows.iter()
            .map(|row| translated_from_row(row, translator))
            .collect()
    }

    async fn surah_description(
        &self,
        surah: SurahNumber,
    ) -> Result<Option<SurahDescription>, StoreError> {
        let mut lease = self.pool.lease().await?;
        let row = sqlx::query(
            r#"
            SELECT surah_id, description, updated_at
            FROM surah_descriptions
            WHERE surah_id = $1
            "#,
        )
        .bind(surah.as_i32())
        .fetch_optional(&mut **lease)
        .await?;

        row.as_ref().map(description_from_row).transpose()
    }
}
