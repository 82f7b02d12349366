//! Named entity extraction for charnet
//!
//! This module turns episode scripts into ordered per-sentence sets of character
//! names, and owns the at-most-once extraction policy backed by the cache table.

pub mod entity_set;
pub mod extractor;
pub mod recognizer;

// Re-export main types
pub use entity_set::EntitySet;
pub use extractor::{EntityExtractor, first_name};
pub use recognizer::{NamedEntityRecognizer, SCRIPT_COLUMN};
