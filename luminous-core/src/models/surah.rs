//! Surah and ayah numbering

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::parse_integer;
use super::ValidationError;

/// Number of surahs in the Quran
pub const SURAH_COUNT: i64 = 114;

/// Validated surah number in 1..=114
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SurahNumber(u16);

impl SurahNumber {
    /// Validate a surah number against the canonical range.
    ///
    /// # Example
    /// ```
    /// use luminous_core::SurahNumber;
    ///
    /// assert!(SurahNumber::new("surah", 1).is_ok());
    /// assert!(SurahNumber::new("surah", 114).is_ok());
    /// assert!(SurahNumber::new("surah", 0).is_err());
    /// assert!(SurahNumber::new("surah", 115).is_err());
    /// ```
    pub fn new(field: &'static str, n: i64) -> Result<Self, ValidationError> {
        if !(1..=SURAH_COUNT).contains(&n) {
            return Err(ValidationError::OutOfRange {
                field,
                min: 1,
                max: Some(SURAH_COUNT),
            });
        }
        // In range, so the cast cannot truncate
        Ok(Self(n as u16))
    }

    /// Parse a raw query-string value.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        Self::new(field, parse_integer(field, raw)?)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn as_i32(self) -> i32 {
        i32::from(self.0)
    }
}

impl fmt::Display for SurahNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated ayah number (1-based within a surah)
///
/// The upper bound depends on the surah and is left to the datastore:
/// an ayah past the end of a surah is a not-found, not a bad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AyahNumber(u64);

impl AyahNumber {
    pub fn new(field: &'static str, n: i64) -> Result<Self, ValidationError> {
        if n < 1 {
            return Err(ValidationError::OutOfRange {
                field,
                min: 1,
                max: None,
            });
        }
        Ok(Self(n.unsigned_abs()))
    }

    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        Self::new(field, parse_integer(field, raw)?)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Value as a Postgres `INTEGER` bind, saturating past `i32::MAX`.
    pub fn as_i32(self) -> i32 {
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for AyahNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Place of revelation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevelationType {
    Meccan,
    Medinan,
}

impl RevelationType {
    /// Parse the stored column value. Seed data has used both the
    /// adjective and the city name, in any case.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meccan" | "mecca" | "makkah" | "makki" => Ok(Self::Meccan),
            "medinan" | "medina" | "madinah" | "madani" => Ok(Self::Medinan),
            _ => Err(ValidationError::InvalidVariant {
                field: "revelation type",
                value: s.to_owned(),
                expected: "Meccan or Medinan",
            }),
        }
    }
}

/// Surah reference entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surah {
    pub number: u16,
    pub arabic_name: String,
    pub transliteration: String,
    pub english_name: String,
    pub ayah_count: u32,
    pub revelation_type: RevelationType,
    pub chronological_order: u16,
    pub rukus: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surah_bounds() {
        assert!(SurahNumber::new("surah", 1).is_ok());
        assert!(SurahNumber::new("surah", 114).is_ok());
        for n in [-1, 0, 115, 1000] {
            let err = SurahNumber::new("surah", n).unwrap_err();
            assert!(matches!(err, ValidationError::OutOfRange { field: "surah", .. }));
        }
    }

    #[test]
    fn surah_parse_reports_type_errors() {
        let err = SurahNumber::parse("surah", "two").unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
        assert_eq!(SurahNumber::parse("surah", "36").unwrap().get(), 36);
    }

    #[test]
    fn ayah_is_one_based() {
        assert!(AyahNumber::new("ayah", 0).is_err());
        assert_eq!(AyahNumber::new("ayah", 1_000_000).unwrap().get(), 1_000_000);
        assert_eq!(AyahNumber::new("ayah", 5_000_000_000).unwrap().get(), 5_000_000_000);
        assert_eq!(AyahNumber::new("ayah", i64::MAX).unwrap().get(), i64::MAX as u64);
    }

    #[test]
    fn ayah_bind_saturates() {
        let ayah = AyahNumber::new("ayah", 5_000_000_000).unwrap();
        assert_eq!(ayah.as_i32(), i32::MAX);
    }

    #[test]
    fn revelation_type_aliases() {
        assert_eq!(RevelationType::parse("Meccan").unwrap(), RevelationType::Meccan);
        assert_eq!(RevelationType::parse("madinah").unwrap(), RevelationType::Medinan);
        assert!(RevelationType::parse("Jerusalem").is_err());
    }

    #[test]
    fn surah_serializes_camel_case() {
        let surah = Surah {
            number: 1,
            arabic_name: "الفاتحة".into(),
            transliteration: "Al-Fatihah".into(),
            english_name: "The Opening".into(),
            ayah_count: 7,
            revelation_type: RevelationType::Meccan,
            chronological_order: 5,
            rukus: 1,
        };
        let json = serde_json::to_value(&surah).unwrap();
        assert_eq!(json["englishName"], "The Opening");
        assert_eq!(json["ayahCount"], 7);
        assert_eq!(json["revelationType"], "Meccan");
    }
}
