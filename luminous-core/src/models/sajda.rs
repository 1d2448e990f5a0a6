//! Prostration points

use serde::{Deserialize, Serialize};

/// A verse marking a prostration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sajda {
    pub surah_number: u16,
    pub ayah_number: u32,
    /// e.g. "recommended" or "obligatory"
    #[serde(rename = "type")]
    pub kind: String,
}
