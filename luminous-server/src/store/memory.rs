//! In-memory store for router tests and local demos
//!
//! Each call takes a lease from its own [`PoolStats`] the way the Postgres
//! repositories do, so tests can check lease accounting without a database.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use luminous_core::{
    AyahNumber, BibleVerse, MetadataKind, MetadataPayload, Sajda, Surah, SurahDescription,
    SurahNumber, TranslatedVerse, TranslatorKey, Verse,
};
use serde_json::Value;

use super::{BibleStore, KeyValueStore, MetadataSource, QuranStore, StoreError};
use crate::db::pool::{Lease, PoolStats};

/// Fixture data behind every store trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    verses: Vec<Verse>,
    translations: Vec<TranslatedVerse>,
    descriptions: Vec<SurahDescription>,
    surahs: Vec<Surah>,
    sajdas: Vec<Sajda>,
    bible: Vec<BibleVerse>,
    items: BTreeMap<String, Value>,
    failing: bool,
    stats: Arc<PoolStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verses(mut self, verses: impl IntoIterator<Item = Verse>) -> Self {
        self.verses.extend(verses);
        self
    }

    pub fn with_translations(mut self, verses: impl IntoIterator<Item = TranslatedVerse>) -> Self {
        self.translations.extend(verses);
        self
    }

    pub fn with_description(mut self, description: SurahDescription) -> Self {
        self.descriptions.push(description);
        self
    }

    pub fn with_surahs(mut self, surahs: impl IntoIterator<Item = Surah>) -> Self {
        self.surahs.extend(surahs);
        self
    }

    pub fn with_sajdas(mut self, sajdas: impl IntoIterator<Item = Sajda>) -> Self {
        self.sajdas.extend(sajdas);
        self
    }

    pub fn with_bible_verses(mut self, verses: impl IntoIterator<Item = BibleVerse>) -> Self {
        self.bible.extend(verses);
        self
    }

    pub fn with_item(mut self, key: impl Into<String>, value: Value) -> Self {
        self.items.insert(key.into(), value);
        self
    }

    /// Make every query fail after its lease is taken.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    fn lease(&self) -> Result<Lease<()>, StoreError> {
        let lease = self.stats.lease(());
        if self.failing {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(lease)
    }
}

#[async_trait]
impl QuranStore for MemoryStore {
    async fn verse(
        &self,
        surah: SurahNumber,
        ayah: AyahNumber,
    ) -> Result<Option<Verse>, StoreError> {
        let _lease = self.lease()?;
        Ok(self
            .verses
            .iter()
            .find(|v| v.surah_id == surah.get() && u64::from(v.verse_number) == ayah.get())
            .cloned())
    }

    async fn verses(&self, surah: SurahNumber) -> Result<Vec<Verse>, StoreError> {
        let _lease = self.lease()?;
        let mut out: Vec<Verse> = self
            .verses
            .iter()
            .filter(|v| v.surah_id == surah.get())
            .cloned()
            .collect();
        out.sort_by_key(|v| v.verse_number);
        Ok(out)
    }

    async fn translation_verses(
        &self,
        surah: SurahNumber,
        translator: TranslatorKey,
    ) -> Result<Vec<TranslatedVerse>, StoreError> {
        let _lease = self.lease()?;
        let mut out: Vec<TranslatedVerse> = self
            .translations
            .iter()
            .filter(|v| v.surah_id == surah.get() && v.translator == translator.as_str())
            .cloned()
            .collect();
        out.sort_by_key(|v| v.verse_number);
        Ok(out)
    }

    async fn surah_description(
        &self,
        surah: SurahNumber,
    ) -> Result<Option<SurahDescription>, StoreError> {
        let _lease = self.lease()?;
        Ok(self
            .descriptions
            .iter()
            .rev()
            .find(|d| d.surah_id == surah.get())
            .cloned())
    }
}

#[async_trait]
impl MetadataSource for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, kind: MetadataKind) -> Result<MetadataPayload, StoreError> {
        let _lease = self.lease()?;
        match kind {
            MetadataKind::SurahList => {
                let mut surahs = self.surahs.clone();
                surahs.sort_by_key(|s| s.number);
                Ok(MetadataPayload::Surahs(surahs))
            }
            MetadataKind::Sajdas => {
                let mut sajdas = self.sajdas.clone();
                sajdas.sort_by_key(|s| (s.surah_number, s.ayah_number));
                Ok(MetadataPayload::Sajdas(sajdas))
            }
            MetadataKind::NavigationIndices => Err(StoreError::NotFound {
                resource: "metadata",
                id: kind.as_str().to_owned(),
            }),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn item(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _lease = self.lease()?;
        Ok(self.items.get(key).cloned())
    }
}

#[async_trait]
impl BibleStore for MemoryStore {
    async fn chapter(
        &self,
        bible_id: &str,
        chapter_id: &str,
    ) -> Result<Vec<BibleVerse>, StoreError> {
        let _lease = self.lease()?;
        let mut out: Vec<BibleVerse> = self
            .bible
            .iter()
            .filter(|v| v.bible_id == bible_id && v.chapter_id == chapter_id)
            .cloned()
            .collect();
        out.sort_by_key(|v| v.verse_number);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(surah: u16, n: u32) -> Verse {
        Verse {
            id: i64::from(surah) * 1000 + i64::from(n),
            surah_id: surah,
            verse_number: n,
            text: format!("{surah}:{n}"),
        }
    }

    #[tokio::test]
    async fn verses_come_back_ordered() {
        let store = MemoryStore::new()
            .with_verses([verse(1, 3), verse(1, 1), verse(2, 1), verse(1, 2)]);
        let surah = SurahNumber::new("surah", 1).unwrap();
        let numbers: Vec<u32> = store
            .verses(surah)
            .await
            .unwrap()
            .iter()
            .map(|v| v.verse_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failing_store_still_releases() {
        let store = MemoryStore::new().failing();
        let surah = SurahNumber::new("surah", 1).unwrap();
        assert!(store.verses(surah).await.is_err());
        assert_eq!(store.stats().acquired(), 1);
        assert_eq!(store.stats().released(), 1);
    }
}
