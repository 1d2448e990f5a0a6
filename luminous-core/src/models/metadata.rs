//! Metadata kinds and payloads

use serde::Serialize;

use super::{Sajda, Surah, ValidationError};

/// Metadata selector from the `type` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    SurahList,
    Sajdas,
    NavigationIndices,
}

impl MetadataKind {
    pub fn parse(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        match s {
            "surah-list" => Ok(Self::SurahList),
            "sajdas" => Ok(Self::Sajdas),
            "navigation-indices" => Ok(Self::NavigationIndices),
            "" => Err(ValidationError::Empty { field }),
            other => Err(ValidationError::InvalidVariant {
                field,
                value: other.to_owned(),
                expected: "surah-list, sajdas or navigation-indices",
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SurahList => "surah-list",
            Self::Sajdas => "sajdas",
            Self::NavigationIndices => "navigation-indices",
        }
    }

    /// Item key used by key-value backends (Edge Config).
    pub fn item_key(self) -> &'static str {
        match self {
            Self::SurahList => "surahList",
            Self::Sajdas => "sajdas",
            Self::NavigationIndices => "navigationIndices",
        }
    }
}

/// Metadata as returned to clients.
///
/// SQL backends produce typed rows; key-value backends hand back the
/// stored document unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataPayload {
    Surahs(Vec<Surah>),
    Sajdas(Vec<Sajda>),
    Document(serde_json::Value),
}
