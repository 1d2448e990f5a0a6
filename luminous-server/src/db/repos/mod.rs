//! Repository implementations for Postgres access
//!
//! Each call follows the same pattern:
//! - one lease from the shared pool
//! - one parameterized statement
//! - rows mapped to DTOs, lease released on drop

pub mod metadata;
pub mod quran;

pub use metadata::{OrmMetadata, SajdaRow, SqlMetadata, SurahRow};
pub use quran::QuranRepo;
