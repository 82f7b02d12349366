//! Character co-occurrence networks
//!
//! This module turns cached per-sentence entity sets into a pruned, weighted
//! graph of which characters appear close together.

pub mod builder;
pub mod graph;

// Re-export main types
pub use builder::{NetworkBuilder, build_graph, rank_edges, select_top_edges, window_ranges};
pub use graph::{CharacterGraph, CharacterNode, CooccurrenceEdge};
