//! # charnet
//!
//! Character co-occurrence networks from episodic dialogue. Episode scripts are
//! split into sentences, person names are extracted per sentence and cached, and
//! characters mentioned within a few sentences of each other are linked in a
//! weighted graph rendered as an interactive vis-network page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use charnet::{CharacterNetworkGenerator, Config};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Loads the BERT recognition model once
//!     let generator = CharacterNetworkGenerator::new(Config::default())?;
//!
//!     // Extraction runs once per cache path; later calls reuse the file
//!     let table = generator.get_entities(Path::new("subtitles/"), Some(Path::new("ners.db")))?;
//!
//!     let graph = generator.build_network(&table)?;
//!     println!("{} characters, {} edges", graph.nodes().len(), graph.edges().len());
//!
//!     std::fs::write("network.html", generator.render(&graph)?)?;
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod ner;
pub mod network;
pub mod render;
pub mod storage;
pub mod text;
pub mod utils;

// Re-export main API types
pub use api::CharacterNetworkGenerator;
pub use config::{Config, NetworkConfig, RenderConfig, WindowPolicy};
pub use error::{CharnetError, Result};

// Re-export commonly used types
pub use ml::{GazetteerBackend, NerBackend};
pub use ner::{EntityExtractor, EntitySet, NamedEntityRecognizer};
pub use network::{CharacterGraph, CooccurrenceEdge, build_graph};
pub use render::{GraphPayload, render_html};
pub use storage::{CacheTable, EpisodeRecord};
pub use text::{Sentence, SentenceSegmenter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_imports() {
        // Ensure all major types can be imported
        let _config = Config::default();
        let _graph = CharacterGraph::default();
    }
}
