//! Extraction cache storage
//!
//! The cache is a flat table with one row per episode: its id, its script and the
//! per-sentence entity sets found in it. It is persisted as an embedded SQLite file.

pub mod codec;
pub mod database;
pub mod schema;

pub use codec::{decode_ners, encode_ners};
pub use database::CacheDatabase;

use crate::ner::EntitySet;
use serde::{Deserialize, Serialize};

/// One cached episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode_id: String,
    pub script: String,
    /// One set per sentence of `script`, in sentence order
    pub ners: Vec<EntitySet>,
}

impl EpisodeRecord {
    /// Number of sentences that mention at least one character
    pub fn sentences_with_entities(&self) -> usize {
        self.ners.iter().filter(|set| !set.is_empty()).count()
    }

    /// Distinct characters mentioned anywhere in the episode
    pub fn characters(&self) -> EntitySet {
        self.ners
            .iter()
            .flat_map(|set| set.iter())
            .collect()
    }
}

/// Episodes in dataset order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheTable {
    episodes: Vec<EpisodeRecord>,
}

impl CacheTable {
    pub fn new(episodes: Vec<EpisodeRecord>) -> Self {
        Self { episodes }
    }

    /// First episode with the given id
    pub fn get(&self, episode_id: &str) -> Option<&EpisodeRecord> {
        self.episodes.iter().find(|e| e.episode_id == episode_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EpisodeRecord> {
        self.episodes.iter()
    }

    pub fn episodes(&self) -> &[EpisodeRecord] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Total number of sentences across all episodes
    pub fn sentence_count(&self) -> usize {
        self.episodes.iter().map(|e| e.ners.len()).sum()
    }
}

impl FromIterator<EpisodeRecord> for CacheTable {
    fn from_iter<I: IntoIterator<Item = EpisodeRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CacheTable {
    type Item = &'a EpisodeRecord;
    type IntoIter = std::slice::Iter<'a, EpisodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.episodes.iter()
    }
}
