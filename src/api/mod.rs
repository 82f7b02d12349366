//! API layer for charnet
//!
//! This module provides the main public interface for generating character
//! networks from episode datasets.

pub mod generator;

// Re-export main API types
pub use generator::CharacterNetworkGenerator;
