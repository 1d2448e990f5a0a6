//! Route modules, one per endpoint family

pub mod ai_translate;
pub mod bible;
pub mod descriptions;
pub mod edge;
pub mod health;
pub mod metadata;
pub mod translations;
pub mod verses;
