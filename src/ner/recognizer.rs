//! Episode-level entity recognition with an at-most-once cache policy
//!
//! `get_entities` computes per-sentence character sets for every episode of a
//! dataset. When a cache path is given and a file already exists there, the file
//! is loaded and trusted as-is; extraction never runs for that path again.

use crate::config::SegmenterConfig;
use crate::dataset::{DatasetRow, load_dataset};
use crate::error::{CharnetError, Result};
use crate::ml::NerBackend;
use crate::ner::{EntityExtractor, EntitySet};
use crate::storage::database::{load_cache, save_cache};
use crate::storage::{CacheTable, EpisodeRecord};
use crate::text::SentenceSegmenter;
use crate::utils::calculate_progress;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;

/// Dataset column holding each episode's full script
pub const SCRIPT_COLUMN: &str = "script";

/// Segments scripts and extracts character names per sentence
pub struct NamedEntityRecognizer {
    segmenter: SentenceSegmenter,
    extractor: EntityExtractor,
    script_column: String,
    max_episodes: Option<usize>,
    progress: Option<ProgressBar>,
}

impl NamedEntityRecognizer {
    /// Create a recognizer around an initialized backend
    pub fn new(backend: Arc<dyn NerBackend>, segmenter_config: SegmenterConfig) -> Result<Self> {
        Ok(Self {
            segmenter: SentenceSegmenter::new(segmenter_config)?,
            extractor: EntityExtractor::new(backend),
            script_column: SCRIPT_COLUMN.to_string(),
            max_episodes: None,
            progress: None,
        })
    }

    /// Only process the first `limit` rows of a dataset
    pub fn with_max_episodes(mut self, limit: usize) -> Self {
        self.max_episodes = Some(limit);
        self
    }

    /// Read scripts from a different column
    pub fn with_script_column(mut self, column: impl Into<String>) -> Self {
        self.script_column = column.into();
        self
    }

    /// Report per-episode progress on `bar`
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Per-sentence character sets for one script, aligned with its sentences
    pub fn ners_for_script(&self, script: &str) -> Result<Vec<EntitySet>> {
        let sentences = self.segmenter.segment(script);
        if sentences.is_empty() {
            log::warn!("Empty script, no sentences to extract from");
            return Ok(Vec::new());
        }
        self.extractor.extract_all(&sentences)
    }

    /// Character sets for every episode of the dataset at `dataset_path`.
    ///
    /// An existing file at `cache_path` is returned without running extraction.
    /// Otherwise the dataset is processed and, when `cache_path` is given, written
    /// there for later calls.
    pub fn get_entities(
        &self,
        dataset_path: &Path,
        cache_path: Option<&Path>,
    ) -> Result<CacheTable> {
        if let Some(cache_path) = cache_path {
            if cache_path.exists() {
                let table = load_cache(cache_path)?;
                log::info!(
                    "Loaded {} cached episodes from {}",
                    table.len(),
                    cache_path.display()
                );
                return Ok(table);
            }
        }

        let rows = load_dataset(dataset_path)?;
        let table = self.get_entities_from_rows(&rows)?;

        if let Some(cache_path) = cache_path {
            save_cache(cache_path, &table)?;
        }

        Ok(table)
    }

    /// Extract character sets for already loaded dataset rows
    pub fn get_entities_from_rows(&self, rows: &[DatasetRow]) -> Result<CacheTable> {
        if rows.is_empty() {
            log::warn!("Dataset has no rows, nothing to extract");
            return Ok(CacheTable::default());
        }

        if let Some(row) = rows.iter().find(|row| !row.has_column(&self.script_column)) {
            log::error!(
                "Episode {} has no '{}' column",
                row.episode_id,
                self.script_column
            );
            return Err(CharnetError::Schema {
                column: self.script_column.clone(),
            });
        }

        let limit = self.max_episodes.unwrap_or(rows.len()).min(rows.len());
        let rows = &rows[..limit];

        if let Some(bar) = &self.progress {
            bar.set_length(rows.len() as u64);
        }

        let mut episodes = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let script = row.text(&self.script_column).unwrap_or_default();
            if script.trim().is_empty() {
                log::warn!("Episode {} has an empty script", row.episode_id);
            }

            let ners = self.ners_for_script(&script)?;
            log::debug!(
                "Episode {}: {} sentences, {} with characters ({:.1}%)",
                row.episode_id,
                ners.len(),
                ners.iter().filter(|set| !set.is_empty()).count(),
                calculate_progress(index + 1, rows.len())
            );

            episodes.push(EpisodeRecord {
                episode_id: row.episode_id.clone(),
                script,
                ners,
            });

            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
        }

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        log::info!(
            "Extracted entities for {} episodes using {}",
            episodes.len(),
            self.extractor.backend_name()
        );
        Ok(CacheTable::new(episodes))
    }
}
