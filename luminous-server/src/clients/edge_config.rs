//! Vercel Edge Config reader
//!
//! Connection strings look like
//! `https://edge-config.vercel.com/ecfg_abc123?token=00000000-...`.
//! Items are read one at a time from `/<id>/item/<key>`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use luminous_core::config::EdgeConfigSettings;
use luminous_core::ConfigError;

use crate::store::{KeyValueStore, StoreError};

const KEY: &str = "EDGE_CONFIG";

/// Edge Config client
#[derive(Debug, Clone)]
pub struct EdgeConfigClient {
    http: Client,
    base: Url,
    id: String,
    token: String,
}

impl EdgeConfigClient {
    pub fn from_connection_string(conn: &str, http: Client) -> Result<Self, ConfigError> {
        let url = Url::parse(conn).map_err(|e| ConfigError::invalid(KEY, e.to_string()))?;

        let id = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ConfigError::invalid(KEY, "missing edge config id"))?;

        let token = url
            .query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::invalid(KEY, "missing token"))?;

        let mut base = url.clone();
        base.set_path("/");
        base.set_query(None);

        Ok(Self {
            http,
            base,
            id,
            token,
        })
    }

    pub fn from_settings(settings: &EdgeConfigSettings, http: Client) -> Result<Self, ConfigError> {
        let conn = settings
            .connection_string
            .as_deref()
            .ok_or(ConfigError::Missing { key: KEY })?;
        Self::from_connection_string(conn, http)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn item_url(&self, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(ConfigError::invalid(KEY, "cannot be a base URL")))?
            .extend([self.id.as_str(), "item", key]);
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}

fn upstream(message: String) -> StoreError {
    StoreError::Upstream {
        service: "edge-config",
        message,
    }
}

#[async_trait]
impl KeyValueStore for EdgeConfigClient {
    async fn item(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let url = self.item_url(key)?;
        let response = self
            .http
            .get(url)
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
    fn parses_connection_string() {
        let client = EdgeConfigClient::from_connection_string(
            "https://edge-config.vercel.com/ecfg_abc123?token=tok-1",
            Client::new(),
        )
        .unwrap();
        assert_eq!(client.id(), "ecfg_abc123");
        assert_eq!(
            client.item_url("quranMetadata").unwrap().as_str(),
            "https://edge-config.vercel.com/ecfg_abc123/item/quranMetadata?token=tok-1"
        );
    }

    #[test]
    fn rejects_missing_token() {
        let err = EdgeConfigClient::from_connection_string(
            "https://edge-config.vercel.com/ecfg_abc123",
            Client::new(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::invalid(KEY, "missing token"));
    }

    #[test]
    fn rejects_missing_id() {
        assert!(EdgeConfigClient::from_connection_string(
            "https://edge-config.vercel.com/?token=t",
            Client::new()
        )
        .is_err());
    }
}
