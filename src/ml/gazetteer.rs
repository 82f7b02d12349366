//! Dictionary backend
//!
//! Recognizes a fixed list of character names by whole-word matching. Useful when
//! the cast is known up front or no model can be downloaded.

use crate::error::{CharnetError, Result};
use crate::ml::backend::{EntityLabel, NerBackend, RecognizedEntity};
use regex::Regex;
use std::path::Path;

/// Whole-word matcher over a list of known person names
pub struct GazetteerBackend {
    pattern: Regex,
    size: usize,
}

impl GazetteerBackend {
    /// Build a matcher from names; longer names win over their prefixes
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            return Err(CharnetError::BackendInit(
                "gazetteer contains no names".to_string(),
            ));
        }

        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();

        let alternation = names
            .iter()
            .map(|n| {
                n.split(' ')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation)).map_err(|e| {
            CharnetError::BackendInit(format!("Failed to compile gazetteer: {}", e))
        })?;

        Ok(Self {
            pattern,
            size: names.len(),
        })
    }

    /// Load names from a file with one name per line; `#` starts a comment line
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CharnetError::BackendInit(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        let backend = Self::new(names)?;
        log::info!("Loaded {} names from {}", backend.len(), path.display());
        Ok(backend)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl NerBackend for GazetteerBackend {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        Ok(self
            .pattern
            .find_iter(text)
            .map(|m| RecognizedEntity {
                text: m.as_str().to_string(),
                label: EntityLabel::Person,
                start: m.start(),
                end: m.end(),
                confidence: 1.0,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "gazetteer"
    }
}
