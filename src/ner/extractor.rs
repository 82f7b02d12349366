//! Entity extraction
//!
//! Runs the recognition backend over single sentences and keeps person entities,
//! normalized to their first whitespace-delimited token ("Uchiha Sasuke" becomes
//! "Uchiha", "Kakashi" stays "Kakashi").

use crate::error::Result;
use crate::ml::NerBackend;
use crate::ner::EntitySet;
use crate::text::Sentence;
use std::sync::Arc;

/// Turns sentences into sets of normalized person names
#[derive(Clone)]
pub struct EntityExtractor {
    backend: Arc<dyn NerBackend>,
}

impl EntityExtractor {
    /// Create an extractor around an initialized backend
    pub fn new(backend: Arc<dyn NerBackend>) -> Self {
        Self { backend }
    }

    /// Person names mentioned in `sentence`; empty when there are none
    pub fn extract(&self, sentence: &Sentence) -> Result<EntitySet> {
        self.extract_text(&sentence.text)
    }

    /// Person names mentioned in a piece of text
    pub fn extract_text(&self, text: &str) -> Result<EntitySet> {
        let entities = self.backend.recognize(text)?;

        Ok(entities
            .iter()
            .filter(|entity| entity.label.is_person())
            .filter_map(|entity| first_name(&entity.text))
            .collect())
    }

    /// One entity set per sentence, in sentence order
    pub fn extract_all(&self, sentences: &[Sentence]) -> Result<Vec<EntitySet>> {
        sentences
            .iter()
            .map(|sentence| self.extract(sentence))
            .collect()
    }

    /// Name of the underlying backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

/// First whitespace-delimited token of a trimmed entity
pub fn first_name(entity_text: &str) -> Option<&str> {
    entity_text.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{EntityLabel, RecognizedEntity};

    /// Backend returning fixed entities regardless of input
    struct FixedBackend(Vec<RecognizedEntity>);

    impl NerBackend for FixedBackend {
        fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn entity(text: &str, label: EntityLabel) -> RecognizedEntity {
        RecognizedEntity {
            text: text.to_string(),
            label,
            start: 0,
            end: text.len(),
            confidence: 1.0,
        }
    }

    fn sentence(text: &str) -> Sentence {
        Sentence {
            index: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_keeps_persons_and_normalizes() {
        let backend = FixedBackend(vec![
            entity("Uchiha Sasuke", EntityLabel::Person),
            entity("  Naruto ", EntityLabel::Person),
            entity("Konoha", EntityLabel::Location),
            entity("Akatsuki", EntityLabel::Organization),
        ]);
        let extractor = EntityExtractor::new(Arc::new(backend));

        let names = extractor.extract(&sentence("anything")).unwrap();
        assert_eq!(names.iter().collect::<Vec<_>>(), vec!["Naruto", "Uchiha"]);
    }

    #[test]
    fn test_duplicates_collapse_within_sentence() {
        let backend = FixedBackend(vec![
            entity("Naruto", EntityLabel::Person),
            entity("Naruto Uzumaki", EntityLabel::Person),
        ]);
        let extractor = EntityExtractor::new(Arc::new(backend));

        let names = extractor.extract(&sentence("anything")).unwrap();
        assert_eq!(names.len(), 1);
        assert!(names.contains("Naruto"));
    }

    #[test]
    fn test_no_persons_yields_empty_set() {
        let backend = FixedBackend(vec![entity("Konoha", EntityLabel::Location)]);
        let extractor = EntityExtractor::new(Arc::new(backend));

        let names = extractor.extract(&sentence("The village slept.")).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_whitespace_only_entity_skipped() {
        let backend = FixedBackend(vec![entity("   ", EntityLabel::Person)]);
        let extractor = EntityExtractor::new(Arc::new(backend));
        assert!(extractor.extract_text("x").unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let backend = FixedBackend(vec![
            entity("Sakura Haruno", EntityLabel::Person),
            entity("Ino", EntityLabel::Person),
        ]);
        let extractor = EntityExtractor::new(Arc::new(backend));
        let s = sentence("Sakura Haruno and Ino argued.");
        assert_eq!(extractor.extract(&s).unwrap(), extractor.extract(&s).unwrap());
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Uchiha Sasuke"), Some("Uchiha"));
        assert_eq!(first_name(" Kakashi "), Some("Kakashi"));
        assert_eq!(first_name(""), None);
    }
}
