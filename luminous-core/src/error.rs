//! Configuration errors for luminous-core.
//!
//! A missing value is not an error at load time: handlers report it
//! when the backend that needs it is first used.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required setting absent
    #[error("{key} is not set")]
    Missing { key: &'static str },

    /// Setting present but unusable
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Config file could not be read or parsed
    #[error("failed to load config file {path:?}: {reason}")]
    File { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }

    /// Name of the offending setting, safe to show to clients.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Missing { key } | Self::Invalid { key, .. } => Some(key),
            Self::File { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_the_variable() {
        let err = ConfigError::Missing {
            key: "DATABASE_URL",
        };
        assert_eq!(err.to_string(), "DATABASE_URL is not set");
        assert_eq!(err.key(), Some("DATABASE_URL"));
    }

    #[test]
    fn invalid_carries_reason() {
        let err = ConfigError::invalid("EDGE_CONFIG", "missing token");
        assert_eq!(err.to_string(), "EDGE_CONFIG is invalid: missing token");
    }
}
