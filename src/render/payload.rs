//! vis-network graph payload
//!
//! Nodes are sized by their total incident weight and edges by their own weight,
//! both scaled linearly so the heaviest item reaches the configured maximum.

use crate::config::RenderConfig;
use crate::error::Result;
use crate::network::CharacterGraph;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A node as vis-network expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub value: u64,
    pub size: f64,
    /// Hover text
    pub title: String,
}

/// An edge as vis-network expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub value: u64,
    pub width: f64,
    pub title: String,
}

/// Everything the page needs to draw the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
    pub options: Value,
}

impl GraphPayload {
    pub fn from_graph(graph: &CharacterGraph, config: &RenderConfig) -> Self {
        let max_node = graph.max_node_weight();
        let max_edge = graph.max_edge_weight();

        let nodes = graph
            .nodes()
            .iter()
            .map(|node| VisNode {
                id: node.name.clone(),
                label: node.name.clone(),
                value: node.weight,
                size: scale(node.weight, max_node, config.max_node_size),
                title: format!(
                    "{}: {} co-occurrences with {} characters",
                    node.name, node.weight, node.degree
                ),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| VisEdge {
                from: edge.source.clone(),
                to: edge.target.clone(),
                value: edge.weight,
                width: scale(edge.weight, max_edge, config.max_edge_width),
                title: format!("{} and {}: {}", edge.source, edge.target, edge.weight),
            })
            .collect();

        Self {
            nodes,
            edges,
            options: vis_options(config),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `maximum * weight / max_weight`, zero when nothing has weight
fn scale(weight: u64, max_weight: u64, maximum: f64) -> f64 {
    if max_weight == 0 {
        0.0
    } else {
        maximum * weight as f64 / max_weight as f64
    }
}

/// Force-directed layout that pulls heavily connected characters to the middle
fn vis_options(config: &RenderConfig) -> Value {
    json!({
        "nodes": {
            "shape": "dot",
            "font": { "color": config.font_color },
        },
        "edges": {
            "color": { "inherit": true },
            "smooth": false,
        },
        "physics": {
            "solver": "forceAtlas2Based",
            "forceAtlas2Based": {
                "gravitationalConstant": -50,
                "centralGravity": 0.01,
                "springLength": 100,
                "springConstant": 0.08,
            },
            "stabilization": { "iterations": 150 },
        },
        "interaction": { "hover": true },
    })
}
