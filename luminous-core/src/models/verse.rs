//! Verses and translations

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Arabic verse text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub id: i64,
    pub surah_id: u16,
    pub verse_number: u32,
    pub text: String,
}

/// Verse translation by a single translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedVerse {
    pub id: i64,
    pub surah_id: u16,
    pub verse_number: u32,
    pub translation: String,
    pub translator: String,
}

/// Accepted translator identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslatorKey {
    /// Abdullah Yusuf Ali, English
    YusufAli,
}

impl TranslatorKey {
    pub const ACCEPTED: &'static str = "en.yusufali";

    pub fn parse(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        match s {
            "en.yusufali" => Ok(Self::YusufAli),
            "" => Err(ValidationError::Empty { field }),
            other => Err(ValidationError::InvalidVariant {
                field,
                value: other.to_owned(),
                expected: Self::ACCEPTED,
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::YusufAli => "en.yusufali",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yusufali_is_accepted() {
        assert_eq!(
            TranslatorKey::parse("translator", "en.yusufali").unwrap(),
            TranslatorKey::YusufAli
        );
        for bad in ["en.sahih", "EN.YUSUFALI", "en.yusufali ", "ar"] {
            assert!(TranslatorKey::parse("translator", bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn rejection_names_accepted_key() {
        let err = TranslatorKey::parse("translator", "en.pickthall").unwrap_err();
        assert!(err.to_string().contains("en.yusufali"));
    }
}
