//! Surah descriptions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text description of a surah
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahDescription {
    pub surah_id: u16,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}
