//! CharacterNetworkGenerator - Main pipeline API
//!
//! This provides the high-level interface for turning an episode dataset into an
//! interactive character network: dataset → cached entity table → graph → HTML.

use crate::config::Config;
use crate::error::Result;
use crate::ml::{NerBackend, load_backend};
use crate::ner::NamedEntityRecognizer;
use crate::network::{CharacterGraph, build_graph};
use crate::render::{GraphPayload, render_payload_html};
use crate::storage::CacheTable;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;

/// Main entry point for building character networks
pub struct CharacterNetworkGenerator {
    config: Config,
    recognizer: NamedEntityRecognizer,
}

impl CharacterNetworkGenerator {
    /// Create a generator, loading the configured recognition backend once
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = load_backend(&config.ner).inspect_err(|e| {
            log::error!("❌ Failed to initialize recognition backend: {}", e);
        })?;
        Self::with_backend(config, backend)
    }

    /// Create a generator around an already constructed backend
    pub fn with_backend(config: Config, backend: Arc<dyn NerBackend>) -> Result<Self> {
        config.validate()?;
        let recognizer = NamedEntityRecognizer::new(backend, config.segmenter.clone())?;
        Ok(Self { config, recognizer })
    }

    /// Only process the first `limit` episodes of a dataset
    pub fn with_max_episodes(mut self, limit: usize) -> Self {
        self.recognizer = self.recognizer.with_max_episodes(limit);
        self
    }

    /// Report extraction progress on `bar`
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.recognizer = self.recognizer.with_progress(bar);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Per-sentence character sets for every episode, cached at `cache_path` when given
    pub fn get_entities(&self, dataset_path: &Path, cache_path: Option<&Path>) -> Result<CacheTable> {
        self.recognizer.get_entities(dataset_path, cache_path)
    }

    /// Co-occurrence network of a cache table
    pub fn build_network(&self, table: &CacheTable) -> Result<CharacterGraph> {
        build_graph(table, &self.config.network)
    }

    /// Visual payload for a graph
    pub fn payload(&self, graph: &CharacterGraph) -> GraphPayload {
        GraphPayload::from_graph(graph, &self.config.render)
    }

    /// Interactive HTML page for a graph
    pub fn render(&self, graph: &CharacterGraph) -> Result<String> {
        render_payload_html(&self.payload(graph), &self.config.render)
    }

    /// Run the whole pipeline and return the HTML page
    pub fn generate(&self, dataset_path: &Path, cache_path: Option<&Path>) -> Result<String> {
        let table = self.get_entities(dataset_path, cache_path)?;
        let graph = self.build_network(&table)?;
        if graph.is_empty() {
            log::warn!("No character co-occurrences found, rendering an empty network");
        } else {
            log::info!(
                "🕸️ Network has {} characters and {} edges",
                graph.nodes().len(),
                graph.edges().len()
            );
        }
        self.render(&graph)
    }
}
