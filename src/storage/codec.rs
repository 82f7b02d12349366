//! Text encoding of the `ners` column
//!
//! A sequence of entity sets is stored as a JSON array of sorted string arrays,
//! one inner array per sentence: `[["Naruto","Sasuke"],[],["Sakura"]]`.

use crate::error::Result;
use crate::ner::EntitySet;

/// Encode per-sentence entity sets
pub fn encode_ners(ners: &[EntitySet]) -> Result<String> {
    Ok(serde_json::to_string(ners)?)
}

/// Decode per-sentence entity sets, describing the first problem on failure
pub fn decode_ners(encoded: &str) -> std::result::Result<Vec<EntitySet>, String> {
    serde_json::from_str(encoded).map_err(|e| format!("invalid ners value: {}", e))
}
