//! Validation error types

use std::fmt;

/// Validation error for request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required parameter absent
    Missing { field: &'static str },

    /// Parameter present but empty
    Empty { field: &'static str },

    /// Parameter is not the expected primitive type
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// Integer outside the accepted range
    OutOfRange {
        field: &'static str,
        min: i64,
        max: Option<i64>,
    },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Value not in the accepted set
    InvalidVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidVariant { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "missing required parameter: {}", field),
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::WrongType { field, expected } => write!(f, "{} must be {}", field, expected),
            Self::OutOfRange {
                field,
                min,
                max: Some(max),
            } => write!(f, "{} must be between {} and {}", field, min, max),
            Self::OutOfRange {
                field,
                min,
                max: None,
            } => write!(f, "{} must be at least {}", field, min),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidVariant {
                field,
                value,
                expected,
            } => write!(f, "invalid {} value: '{}' (expected {})", field, value, expected),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse a query-string value as a base-10 integer.
pub fn parse_integer(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    trimmed.parse::<i64>().map_err(|_| ValidationError::WrongType {
        field,
        expected: "an integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::OutOfRange {
            field: "surah",
            min: 1,
            max: Some(114),
        };
        assert_eq!(err.to_string(), "surah must be between 1 and 114");

        let err = ValidationError::OutOfRange {
            field: "ayah",
            min: 1,
            max: None,
        };
        assert_eq!(err.to_string(), "ayah must be at least 1");

        let err = ValidationError::Missing { field: "surah" };
        assert_eq!(err.to_string(), "missing required parameter: surah");
    }

    #[test]
    fn parses_integers() {
        assert_eq!(parse_integer("surah", "  7 ").unwrap(), 7);
        assert_eq!(parse_integer("surah", "-3").unwrap(), -3);
    }

    #[test]
    fn rejects_non_integers() {
        assert!(matches!(
            parse_integer("surah", "1.5"),
            Err(ValidationError::WrongType { field: "surah", .. })
        ));
        assert!(matches!(
            parse_integer("surah", "abc"),
            Err(ValidationError::WrongType { .. })
        ));
        assert!(matches!(
            parse_integer("ayah", ""),
            Err(ValidationError::Empty { field: "ayah" })
        ));
    }
}
