//! Recognition backend abstraction
//!
//! A backend turns one sentence into labelled entity spans. It is constructed once,
//! shared read-only across all extraction calls, and injected into the
//! [`EntityExtractor`](crate::ner::EntityExtractor) so tests can substitute a stub.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Coarse entity category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Location,
    Organization,
    Miscellaneous,
    Other(String),
}

impl EntityLabel {
    /// Map a model tag such as `B-PER`, `I-LOC` or `PERSON` to a label
    pub fn from_tag(tag: &str) -> Self {
        let bare = tag
            .strip_prefix("B-")
            .or_else(|| tag.strip_prefix("I-"))
            .or_else(|| tag.strip_prefix("E-"))
            .or_else(|| tag.strip_prefix("S-"))
            .unwrap_or(tag);

        match bare.to_uppercase().as_str() {
            "PER" | "PERSON" => EntityLabel::Person,
            "LOC" | "LOCATION" | "GPE" => EntityLabel::Location,
            "ORG" | "ORGANIZATION" => EntityLabel::Organization,
            "MISC" => EntityLabel::Miscellaneous,
            _ => EntityLabel::Other(bare.to_string()),
        }
    }

    pub fn is_person(&self) -> bool {
        matches!(self, EntityLabel::Person)
    }
}

/// An entity span found in a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// The entity text as it appears in the source
    pub text: String,
    pub label: EntityLabel,
    /// Start byte offset in the source text
    pub start: usize,
    /// End byte offset in the source text
    pub end: usize,
    /// Recognition confidence (0.0-1.0)
    pub confidence: f32,
}

/// Named entity recognition over single sentences
pub trait NerBackend: Send + Sync {
    /// Recognize entities in `text`
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>>;

    /// Short identifier used in logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mapping() {
        assert_eq!(EntityLabel::from_tag("B-PER"), EntityLabel::Person);
        assert_eq!(EntityLabel::from_tag("I-PER"), EntityLabel::Person);
        assert_eq!(EntityLabel::from_tag("PERSON"), EntityLabel::Person);
        assert_eq!(EntityLabel::from_tag("B-LOC"), EntityLabel::Location);
        assert_eq!(EntityLabel::from_tag("GPE"), EntityLabel::Location);
        assert_eq!(EntityLabel::from_tag("I-ORG"), EntityLabel::Organization);
        assert_eq!(EntityLabel::from_tag("B-MISC"), EntityLabel::Miscellaneous);
        assert_eq!(
            EntityLabel::from_tag("DATE"),
            EntityLabel::Other("DATE".to_string())
        );
    }

    #[test]
    fn test_is_person() {
        assert!(EntityLabel::Person.is_person());
        assert!(!EntityLabel::Location.is_person());
    }
}
