//! Domain models with validation at construction
//!
//! All request input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod bible;
pub mod description;
pub mod metadata;
pub mod sajda;
pub mod surah;
pub mod validation;
pub mod verse;

pub use bible::BibleVerse;
pub use description::SurahDescription;
pub use metadata::{MetadataKind, MetadataPayload};
pub use sajda::Sajda;
pub use surah::{AyahNumber, RevelationType, Surah, SurahNumber, SURAH_COUNT};
pub use validation::ValidationError;
pub use verse::{TranslatedVerse, TranslatorKey, Verse};
