//! Vercel Blob document reader

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use luminous_core::config::BlobSettings;
use luminous_core::ConfigError;

use crate::store::{KeyValueStore, StoreError};

/// Reads JSON documents by path from a blob store
#[derive(Debug, Clone)]
pub struct BlobClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl BlobClient {
    pub fn new(base_url: &str, token: Option<String>, http: Client) -> Result<Self, ConfigError> {
        let mut base =
            Url::parse(base_url).map_err(|e| ConfigError::invalid("BLOB_BASE_URL", e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::invalid("BLOB_BASE_URL", "not a base URL"));
        }
        // Keys are joined relative to the store root
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base, token })
    }

    pub fn from_settings(settings: &BlobSettings, http: Client) -> Result<Self, ConfigError> {
        let base = settings.base_url.as_deref().ok_or(ConfigError::Missing {
            key: "BLOB_BASE_URL",
        })?;
        Self::new(base, settings.read_write_token.clone(), http)
    }

    pub fn document_url(&self, key: &str) -> Result<Url, StoreError> {
        // Relative keys only; a leading slash would escape a path-prefixed store
        self.base
            .join(key.trim_start_matches('/'))
            .map_err(|e| upstream(e.to_string()))
    }
}

fn upstream(message: String) -> StoreError {
    StoreError::Upstream {
        service: "blob",
        message,
    }
}

#[async_trait]
impl KeyValueStore for BlobClient {
    async fn item(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut request = self.http.get(self.document_url(key)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| upstream(e.without_url().to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<Value>()
                .await
                .map(Some)
                .map_err(|e| upstream(e.without_url().to_string())),
            status => Err(upstream(format!("status {}", status.as_u16()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_keys_under_store_root() {
        let client = BlobClient::new(
            "https://store.public.blob.vercel-storage.com/quran",
            None,
            Client::new(),
        )
        .unwrap();
        assert_eq!(
            client.document_url("metadata/sajdas.json").unwrap().as_str(),
            "https://store.public.blob.vercel-storage.com/quran/metadata/sajdas.json"
        );
        assert_eq!(
            client.document_url("/metadata/sajdas.json").unwrap().as_str(),
            "https://store.public.blob.vercel-storage.com/quran/metadata/sajdas.json"
        );
    }

    #[test]
    fn missing_base_is_a_config_error() {
        let err = BlobClient::from_settings(&BlobSettings::default(), Client::new()).unwrap_err();
        assert_eq!(err.key(), Some("BLOB_BASE_URL"));
    }
}
