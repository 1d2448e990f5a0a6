//! Bible reference text

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum length of a bible or chapter identifier
const MAX_IDENT_LEN: usize = 64;

/// A single Bible verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleVerse {
    pub id: String,
    pub org_id: String,
    pub bible_id: String,
    pub book_id: String,
    pub chapter_id: String,
    /// Human-readable reference, e.g. "John 3:16"
    pub reference: String,
    pub verse_number: u32,
    pub content: String,
}

/// Validate a bible or chapter identifier such as `de4e12af7f28f599-02`
/// or `JHN.3`.
pub fn validate_ident(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if s.len() > MAX_IDENT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_IDENT_LEN,
        });
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ValidationError::WrongType {
            field,
            expected: "an identifier of letters, digits, '.', '-' or '_'",
        });
    }
    Ok(s.to_owned())
}
