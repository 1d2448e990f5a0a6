//! AI verse translation seam

use async_trait::async_trait;
use luminous_core::{AyahNumber, ConfigError, SurahNumber};

/// One verse to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub verse_text: String,
    pub surah: SurahNumber,
    pub verse: AyahNumber,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("translation provider returned status {status}")]
    Status { status: u16 },

    #[error("translation provider request failed: {0}")]
    Transport(String),

    #[error("translation provider returned no text")]
    Empty,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError>;
}

#[async_trait]
impl Translator for crate::store::Unconfigured {
    async fn translate(&self, _: &TranslationRequest) -> Result<String, TranslateError> {
        Err(TranslateError::Config(self.0.clone()))
    }
}
