//! LibSQL (Turso) client over the Hrana v2 HTTP pipeline
//!
//! Each call sends one `execute` followed by `close`, so no stream (baton)
//! outlives the request.

use async_trait::async_trait;
use luminous_core::config::LibsqlSettings;
use luminous_core::{BibleVerse, ConfigError, MetadataKind, MetadataPayload, Sajda, Surah};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::db::repos::metadata::{SAJDAS_SQL, SURAH_LIST_SQL};
use crate::db::repos::{SajdaRow, SurahRow};
use crate::store::{narrow, BibleStore, MetadataSource, StoreError};

/// Hrana value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LibsqlValue {
    Null,
    /// Integers travel as strings to keep 64-bit precision
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

impl LibsqlValue {
    pub fn integer(n: i64) -> Self {
        Self::Integer {
            value: n.to_string(),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { value: s.into() }
    }
}

#[derive(Debug, Serialize)]
struct PipelineRequest<'a> {
    requests: [StreamRequest<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamRequest<'a> {
    Execute { stmt: Stmt<'a> },
    Close,
}

#[derive(Debug, Serialize)]
struct Stmt<'a> {
    sql: &'a str,
    args: &'a [LibsqlValue],
}

#[derive(Debug, Deserialize)]
struct PipelineResponse {
    results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: ProtoError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamResponse {
    Execute { result: ResultSet },
    Close,
}

#[derive(Debug, Deserialize)]
struct ProtoError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub name: Option<String>,
}

/// Rows returned by one statement
#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    pub cols: Vec<Column>,
    pub rows: Vec<Vec<LibsqlValue>>,
}

/// Borrowed view of one row with by-name access
pub struct LibsqlRow<'a> {
    cols: &'a [Column],
    values: &'a [LibsqlValue],
}

impl ResultSet {
    pub fn rows(&self) -> impl Iterator<Item = LibsqlRow<'_>> {
        self.rows.iter().map(|values| LibsqlRow {
            cols: &self.cols,
            values,
        })
    }
}

impl<'a> LibsqlRow<'a> {
    fn value(&self, name: &'static str) -> Result<&'a LibsqlValue, StoreError> {
        self.cols
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| StoreError::Decode {
                resource: "libsql row",
                reason: format!("missing column {}", name),
            })
    }

    pub fn integer(&self, name: &'static str) -> Result<i64, StoreError> {
        match self.value(name)? {
            LibsqlValue::Integer { value } => value.parse().map_err(|_| StoreError::Decode {
                resource: "libsql row",
                reason: format!("column {} is not a valid integer", name),
            }),
            other => Err(type_mismatch(name, "integer", other)),
        }
    }

    pub fn text(&self, name: &'static str) -> Result<String, StoreError> {
        match self.value(name)? {
            LibsqlValue::Text { value } => Ok(value.clone()),
            // Ids seeded as numbers still read as text
            LibsqlValue::Integer { value } => Ok(value.clone()),
            other => Err(type_mismatch(name, "text", other)),
        }
    }
}

fn type_mismatch(name: &str, expected: &str, got: &LibsqlValue) -> StoreError {
    let got = match got {
        LibsqlValue::Null => "null",
        LibsqlValue::Integer { .. } => "integer",
        LibsqlValue::Float { .. } => "float",
        LibsqlValue::Text { .. } => "text",
        LibsqlValue::Blob { .. } => "blob",
    };
    StoreError::Decode {
        resource: "libsql row",
        reason: format!("column {} expected {}, got {}", name, expected, got),
    }
}

/// Turso HTTP client
#[derive(Debug, Clone)]
pub struct LibsqlClient {
    http: Client,
    pipeline_url: Url,
    auth_token: Option<String>,
}

impl LibsqlClient {
    /// Accepts `libsql://`, `https://` or `http://` database URLs.
    pub fn new(url: &str, auth_token: Option<String>, http: Client) -> Result<Self, ConfigError> {
        let normalized = match url.strip_prefix("libsql://") {
            Some(rest) => format!("https://{}", rest),
            None => url.to_owned(),
        };
        let base = Url::parse(&normalized)
            .map_err(|e| ConfigError::invalid("TURSO_DATABASE_URL", e.to_string()))?;
        if !matches!(base.scheme(), "https" | "http") {
            return Err(ConfigError::invalid(
                "TURSO_DATABASE_URL",
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }
        let pipeline_url = base
            .join("/v2/pipeline")
            .map_err(|e| ConfigError::invalid("TURSO_DATABASE_URL", e.to_string()))?;

        Ok(Self {
            http,
            pipeline_url,
            auth_token,
        })
    }

    pub fn from_settings(settings: &LibsqlSettings, http: Client) -> Result<Self, ConfigError> {
        let url = settings.url.as_deref().ok_or(ConfigError::Missing {
            key: "TURSO_DATABASE_URL",
        })?;
        Self::new(url, settings.auth_token.clone(), http)
    }

    pub fn pipeline_url(&self) -> &Url {
        &self.pipeline_url
    }

    /// Run one statement and return its rows.
    pub async fn execute(&self, sql: &str, args: &[LibsqlValue]) -> Result<ResultSet, StoreError> {
        let body = PipelineRequest {
            requests: [StreamRequest::Execute { stmt: Stmt { sql, args } }, StreamRequest::Close],
        };

        let mut request = self.http.post(self.pipeline_url.clone()).json(&body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| upstream(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %detail, "libsql pipeline rejected");
            return Err(upstream(format!("status {}", status.as_u16())));
        }

        let parsed: PipelineResponse = response.json().await.map_err(|e| upstream(e.to_string()))?;
        parse_pipeline(parsed)
    }
}

fn upstream(message: String) -> StoreError {
    StoreError::Upstream {
        service: "libsql",
        message,
    }
}

fn parse_pipeline(response: PipelineResponse) -> Result<ResultSet, StoreError> {
    match response.results.into_iter().next() {
        Some(StreamResult::Ok {
            response: StreamResponse::Execute { result },
        }) => Ok(result),
        Some(StreamResult::Error { error }) => Err(StoreError::Libsql {
            message: error.message,
            code: error.code,
        }),
        Some(StreamResult::Ok {
            response: StreamResponse::Close,
        })
        | None => Err(upstream("pipeline returned no execute result".to_string())),
    }
}

fn bible_verse(row: &LibsqlRow<'_>) -> Result<BibleVerse, StoreError> {
    Ok(BibleVerse {
        id: row.text("id")?,
        org_id: row.text("org_id")?,
        bible_id: row.text("bible_id")?,
        book_id: row.text("book_id")?,
        chapter_id: row.text("chapter_id")?,
        reference: row.text("reference")?,
        verse_number: narrow("bible verse", "verse_number", row.integer("verse_number")?)?,
        content: row.text("content")?,
    })
}

/// Bible chapters from Turso
pub struct LibsqlBibleStore {
    client: LibsqlClient,
}

impl LibsqlBibleStore {
    pub fn new(client: LibsqlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BibleStore for LibsqlBibleStore {
    async fn chapter(
        &self,
        bible_id: &str,
        chapter_id: &str,
    ) -> Result<Vec<BibleVerse>, StoreError> {
        let result = self
            .client
            .execute(
                r#"
                SELECT id, org_id, bible_id, book_id, chapter_id, reference, verse_number, content
                FROM bible_verses
                WHERE bible_id = ? AND chapter_id = ?
                ORDER BY verse_number ASC
                "#,
                &[LibsqlValue::text(bible_id), LibsqlValue::text(chapter_id)],
            )
            .await?;

        result.rows().map(|row| bible_verse(&row)).collect()
    }
}

/// Metadata tables mirrored in Turso
pub struct LibsqlMetadata {
    client: LibsqlClient,
}

impl LibsqlMetadata {
    pub fn new(client: LibsqlClient) -> Self {
        Self { client }
    }
}

fn to_i32(name: &'static str, v: i64) -> Result<i32, StoreError> {
    narrow("libsql row", name, v)
}

#[async_trait]
impl MetadataSource for LibsqlMetadata {
    fn backend(&self) -> &'static str {
        "libsql"
    }

    async fn fetch(&self, kind: MetadataKind) -> Result<MetadataPayload, StoreError> {
        match kind {
            MetadataKind::SurahList => {
                let result = self.client.execute(SURAH_LIST_SQL, &[]).await?;
                let surahs = result
                    .rows()
                    .map(|row| {
                        let r = SurahRow {
                            number: to_i32("number", row.integer("number")?)?,
                            arabic_name: row.text("arabic_name")?,
                            transliteration: row.text("transliteration")?,
                            english_name: row.text("english_name")?,
                            ayah_count: to_i32("ayah_count", row.integer("ayah_count")?)?,
                            revelation_type: row.text("revelation_type")?,
                            chronological_order: to_i32(
                                "chronological_order",
                                row.integer("chronological_order")?,
                            )?,
                            rukus: to_i32("rukus", row.integer("rukus")?)?,
                        };
                        Surah::try_from(r)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MetadataPayload::Surahs(surahs))
            }
            MetadataKind::Sajdas => {
                let result = self.client.execute(SAJDAS_SQL, &[]).await?;
                let sajdas = result
                    .rows()
                    .map(|row| {
                        let r = SajdaRow {
                            surah_number: to_i32("surah_number", row.integer("surah_number")?)?,
                            ayah_number: to_i32("ayah_number", row.integer("ayah_number")?)?,
                            sajda_type: row.text("sajda_type")?,
                        };
                        Sajda::try_from(r)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MetadataPayload::Sajdas(sajdas))
            }
            MetadataKind::NavigationIndices => Err(StoreError::NotFound {
                resource: "metadata",
                id: kind.as_str().to_owned(),
            }),
        }
    }
}
