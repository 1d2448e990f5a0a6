//! luminous-core: reference-text models shared by the Luminous Verses API
//!
//! - Validated parameter types (surah and ayah numbers, translator keys)
//! - Read-oriented DTOs mirrored from the relational tables
//! - Layered configuration (defaults, TOML file, environment)

pub mod config;
pub mod error;
pub mod models;

pub use config::{MetadataBackend, Settings};
pub use error::ConfigError;
pub use models::{
    AyahNumber, BibleVerse, MetadataKind, MetadataPayload, RevelationType, Sajda, Surah,
    SurahDescription, SurahNumber, TranslatedVerse, TranslatorKey, ValidationError, Verse,
};
