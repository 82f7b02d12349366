//! Character graph types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weighted co-occurrence between two distinct characters.
///
/// Names are stored canonically, `source < target`, so an unordered pair has
/// exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CooccurrenceEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
}

impl CooccurrenceEdge {
    /// Edge between `a` and `b` in canonical order; `None` for a self-pair
    pub fn new(a: impl Into<String>, b: impl Into<String>, weight: u64) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self {
                source: a,
                target: b,
                weight,
            }),
            std::cmp::Ordering::Greater => Some(Self {
                source: b,
                target: a,
                weight,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn involves(&self, name: &str) -> bool {
        self.source == name || self.target == name
    }
}

/// A character with at least one retained edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterNode {
    pub name: String,
    /// Sum of the weights of the node's retained edges
    pub weight: u64,
    pub degree: usize,
}

/// Nodes and retained edges of a co-occurrence network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterGraph {
    nodes: Vec<CharacterNode>,
    edges: Vec<CooccurrenceEdge>,
}

impl CharacterGraph {
    /// Build a graph from its edges; nodes are exactly the edge endpoints, sorted by name
    pub fn from_edges(edges: Vec<CooccurrenceEdge>) -> Self {
        let mut totals: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
        for edge in &edges {
            for name in [edge.source.as_str(), edge.target.as_str()] {
                let entry = totals.entry(name).or_default();
                entry.0 += edge.weight;
                entry.1 += 1;
            }
        }

        let nodes = totals
            .into_iter()
            .map(|(name, (weight, degree))| CharacterNode {
                name: name.to_string(),
                weight,
                degree,
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[CharacterNode] {
        &self.nodes
    }

    /// Edges ranked by weight, heaviest first
    pub fn edges(&self) -> &[CooccurrenceEdge] {
        &self.edges
    }

    pub fn node(&self, name: &str) -> Option<&CharacterNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Edge between two names, in either order
    pub fn edge(&self, a: &str, b: &str) -> Option<&CooccurrenceEdge> {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn max_node_weight(&self) -> u64 {
        self.nodes.iter().map(|n| n.weight).max().unwrap_or(0)
    }

    pub fn max_edge_weight(&self) -> u64 {
        self.edges.iter().map(|e| e.weight).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_canonical_order() {
        let edge = CooccurrenceEdge::new("Sasuke", "Naruto", 2).unwrap();
        assert_eq!(edge.source, "Naruto");
        assert_eq!(edge.target, "Sasuke");
        assert!(edge.involves("Sasuke"));
        assert!(CooccurrenceEdge::new("Naruto", "Naruto", 1).is_none());
    }

    #[test]
    fn test_nodes_derived_from_edges() {
        let graph = CharacterGraph::from_edges(vec![
            CooccurrenceEdge::new("Naruto", "Sasuke", 5).unwrap(),
            CooccurrenceEdge::new("Naruto", "Sakura", 2).unwrap(),
        ]);

        let names: Vec<&str> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Naruto", "Sakura", "Sasuke"]);

        let naruto = graph.node("Naruto").unwrap();
        assert_eq!(naruto.weight, 7);
        assert_eq!(naruto.degree, 2);
        assert_eq!(graph.max_node_weight(), 7);
        assert_eq!(graph.max_edge_weight(), 5);
        assert_eq!(graph.edge("Sasuke", "Naruto").unwrap().weight, 5);
    }

    #[test]
    fn test_empty_graph() {
        let graph = CharacterGraph::from_edges(Vec::new());
        assert!(graph.is_empty());
        assert!(graph.nodes().is_empty());
        assert_eq!(graph.max_node_weight(), 0);
    }
}
