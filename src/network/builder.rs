//! Windowed co-occurrence counting
//!
//! Every window of consecutive sentences adds one to the weight of each unordered
//! pair of distinct names in the union of its entity sets. Counting is keyed on
//! interned name ids so the inner loop never clones strings.

use crate::config::{NetworkConfig, WindowPolicy};
use crate::error::{CharnetError, Result};
use crate::network::graph::{CharacterGraph, CooccurrenceEdge};
use crate::ner::EntitySet;
use crate::storage::CacheTable;
use std::collections::HashMap;
use std::ops::Range;

/// Accumulates pair weights across episodes
pub struct NetworkBuilder {
    window_size: usize,
    policy: WindowPolicy,
    names: Vec<String>,
    ids: HashMap<String, usize>,
    counts: HashMap<(usize, usize), u64>,
    windows: usize,
}

impl NetworkBuilder {
    pub fn new(window_size: usize, policy: WindowPolicy) -> Result<Self> {
        if window_size == 0 {
            return Err(CharnetError::Config(
                "window_size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            window_size,
            policy,
            names: Vec::new(),
            ids: HashMap::new(),
            counts: HashMap::new(),
            windows: 0,
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        Self::new(config.window_size, config.window_policy)
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Count the windows of one episode's per-sentence entity sets
    pub fn add_episode(&mut self, ners: &[EntitySet]) {
        let ranges = window_ranges(ners.len(), self.window_size, self.policy);
        let mut members: Vec<usize> = Vec::new();

        for range in ranges {
            members.clear();
            for set in &ners[range] {
                for name in set.iter() {
                    let id = self.intern(name);
                    members.push(id);
                }
            }
            members.sort_unstable();
            members.dedup();

            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    *self.counts.entry((a, b)).or_insert(0) += 1;
                }
            }
            self.windows += 1;
        }
    }

    /// Number of windows counted so far
    pub fn window_count(&self) -> usize {
        self.windows
    }

    /// Every counted pair, ranked
    pub fn edge_list(&self) -> Vec<CooccurrenceEdge> {
        let mut edges: Vec<CooccurrenceEdge> = self
            .counts
            .iter()
            .filter_map(|(&(a, b), &weight)| {
                CooccurrenceEdge::new(self.names[a].as_str(), self.names[b].as_str(), weight)
            })
            .collect();
        rank_edges(&mut edges);
        edges
    }

    /// Graph of the `top_k` heaviest edges
    pub fn finish(self, top_k: usize) -> CharacterGraph {
        let edges = self.edge_list();
        let total = edges.len();
        let graph = CharacterGraph::from_edges(select_top_edges(edges, top_k));

        log::info!(
            "Built network from {} windows: kept {} of {} edges, {} characters",
            self.windows,
            graph.edges().len(),
            total,
            graph.nodes().len()
        );
        graph
    }
}

/// Sentence ranges covered by each window of an episode with `len` sentences.
///
/// An episode shorter than the window yields a single window over all of it.
/// Tumbling windows keep a trailing partial block.
pub fn window_ranges(len: usize, window_size: usize, policy: WindowPolicy) -> Vec<Range<usize>> {
    if len == 0 || window_size == 0 {
        return Vec::new();
    }
    if len <= window_size {
        return vec![0..len];
    }

    match policy {
        WindowPolicy::Sliding => (0..=len - window_size)
            .map(|start| start..start + window_size)
            .collect(),
        WindowPolicy::Tumbling => (0..len)
            .step_by(window_size)
            .map(|start| start..(start + window_size).min(len))
            .collect(),
    }
}

/// Sort by weight descending, then by (source, target) ascending
pub fn rank_edges(edges: &mut [CooccurrenceEdge]) {
    edges.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
}

/// The first `top_k` edges in rank order
pub fn select_top_edges(mut edges: Vec<CooccurrenceEdge>, top_k: usize) -> Vec<CooccurrenceEdge> {
    rank_edges(&mut edges);
    edges.truncate(top_k);
    edges
}

/// Build the character network for every episode of a cache table
pub fn build_graph(table: &CacheTable, config: &NetworkConfig) -> Result<CharacterGraph> {
    let mut builder = NetworkBuilder::from_config(config)?;
    for episode in table {
        log::debug!(
            "Counting co-occurrences in episode {} ({} sentences)",
            episode.episode_id,
            episode.ners.len()
        );
        builder.add_episode(&episode.ners);
    }
    Ok(builder.finish(config.top_k))
}
