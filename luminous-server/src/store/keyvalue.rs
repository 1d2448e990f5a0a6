//! Metadata over a key-value store (Edge Config items or Blob documents)

use std::sync::Arc;

use async_trait::async_trait;
use luminous_core::{MetadataKind, MetadataPayload};

use super::{KeyValueStore, MetadataSource, StoreError};

/// Adapts a [`KeyValueStore`] to [`MetadataSource`], one key per kind
pub struct KeyValueMetadata {
    store: Arc<dyn KeyValueStore>,
    key_for: fn(MetadataKind) -> String,
    backend: &'static str,
}

impl KeyValueMetadata {
    /// Edge Config layout: items `surahList` and `sajdas`
    pub fn edge_config(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key_for: |kind| kind.item_key().to_owned(),
            backend: "edge-config",
        }
    }

    /// Blob layout: `metadata/surah-list.json` and `metadata/sajdas.json`
    pub fn blob(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key_for: |kind| format!("metadata/{}.json", kind.as_str()),
            backend: "blob",
        }
    }
}

#[async_trait]
impl MetadataSource for KeyValueMetadata {
    fn backend(&self) -> &'static str {
        self.backend
    }

    async fn fetch(&self, kind: MetadataKind) -> Result<MetadataPayload, StoreError> {
        let key = (self.key_for)(kind);
        match self.store.item(&key).await? {
            Some(doc) => Ok(MetadataPayload::Document(doc)),
            None => Err(StoreError::NotFound {
                resource: "metadata",
                id: key,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn edge_layout_reads_item_keys() {
        let store = Arc::new(MemoryStore::new().with_item("surahList", json!([{ "number": 1 }])));
        let source = KeyValueMetadata::edge_config(store);
        let payload = source.fetch(MetadataKind::SurahList).await.unwrap();
        assert_eq!(payload, MetadataPayload::Document(json!([{ "number": 1 }])));
    }

    #[tokio::test]
    async fn blob_layout_reads_paths() {
        let store = Arc::new(MemoryStore::new().with_item("metadata/sajdas.json", json!([])));
        let source = KeyValueMetadata::blob(store);
        assert!(source.fetch(MetadataKind::Sajdas).await.is_ok());
    }

    #[tokio::test]
    async fn absent_key_is_not_found() {
        let source = KeyValueMetadata::edge_config(Arc::new(MemoryStore::new()));
        let err = source.fetch(MetadataKind::Sajdas).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id, .. } if id == "sajdas"));
    }
}
