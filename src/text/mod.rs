//! Text processing for charnet
//!
//! This module splits raw episode scripts into the ordered sentences that
//! serve as the unit of co-occurrence windowing.

pub mod segmenter;

// Re-export main types
pub use segmenter::{Sentence, SentenceSegmenter};
