//! Sentence segmentation
//!
//! Splits a script into sentences on terminal punctuation, skipping periods that
//! belong to abbreviations or initials. The result depends only on the input text
//! and the configured abbreviation list, so windowing downstream is reproducible.

use crate::config::SegmenterConfig;
use crate::error::{CharnetError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Abbreviations that only hold before a number
const NUMBERED_ABBREVIATIONS: &[&str] = &["no", "vol", "fig"];

/// Capital letters that are words on their own rather than initials
const SINGLE_LETTER_WORDS: &[char] = &['I', 'A'];

/// One sentence of an episode script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Position within the episode, starting at 0
    pub index: usize,

    /// Sentence text with whitespace normalized
    pub text: String,
}

/// Rule-based sentence splitter
pub struct SentenceSegmenter {
    boundary_regex: Regex,
    whitespace_regex: Regex,
    abbreviations: HashSet<String>,
}

impl SentenceSegmenter {
    /// Create a new segmenter with the given configuration
    pub fn new(config: SegmenterConfig) -> Result<Self> {
        let boundary_regex = Regex::new(r#"[.!?…]+["'”’)\]]*\s+"#).map_err(|e| {
            CharnetError::TextProcessing(format!("Failed to compile sentence regex: {}", e))
        })?;

        let whitespace_regex = Regex::new(r"\s+").map_err(|e| {
            CharnetError::TextProcessing(format!("Failed to compile whitespace regex: {}", e))
        })?;

        let abbreviations = config
            .abbreviations
            .iter()
            .map(|a| a.trim_end_matches('.').to_lowercase())
            .collect();

        Ok(Self {
            boundary_regex,
            whitespace_regex,
            abbreviations,
        })
    }

    /// Create a segmenter with default configuration
    pub fn with_default_config() -> Result<Self> {
        Self::new(SegmenterConfig::default())
    }

    /// Split a script into ordered sentences.
    ///
    /// Empty or whitespace-only scripts yield no sentences.
    pub fn segment(&self, script: &str) -> Vec<Sentence> {
        let text = self.normalize(script);
        let mut sentences = Vec::new();

        if text.is_empty() {
            return sentences;
        }

        let mut start = 0;
        for boundary in self.boundary_regex.find_iter(&text) {
            let preceding = &text[start..boundary.start()];
            if self.is_false_boundary(preceding, boundary.as_str(), &text[boundary.end()..]) {
                continue;
            }

            push_sentence(&mut sentences, &text[start..boundary.end()]);
            start = boundary.end();
        }

        if start < text.len() {
            push_sentence(&mut sentences, &text[start..]);
        }

        sentences
    }

    /// Collapse line breaks and runs of whitespace into single spaces
    fn normalize(&self, text: &str) -> String {
        let joined = text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.whitespace_regex.replace_all(&joined, " ").to_string()
    }

    /// A single period after an abbreviation or an initial, or one followed by
    /// a lowercase word, does not end the sentence. Numbering abbreviations such as
    /// "No." only count when a digit follows.
    fn is_false_boundary(&self, preceding: &str, punctuation: &str, rest: &str) -> bool {
        let marks = punctuation
            .trim_end()
            .trim_end_matches(['"', '\'', '”', '’', ')', ']']);
        if marks != "." {
            return false;
        }

        let last_word = preceding
            .split_whitespace()
            .last()
            .unwrap_or("")
            .trim_start_matches(['"', '\'', '“', '‘', '(', '[']);

        let lowered = last_word.to_lowercase();
        if self.abbreviations.contains(&lowered) {
            if !NUMBERED_ABBREVIATIONS.contains(&lowered.as_str()) {
                return true;
            }
            // "No. 7" continues, "No. Naruto will not go." does not
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return true;
            }
        }

        let mut chars = last_word.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_alphabetic() && c.is_uppercase() && !SINGLE_LETTER_WORDS.contains(&c) {
                return true;
            }
        }

        rest.chars().next().is_some_and(|c| c.is_lowercase())
    }
}

fn push_sentence(sentences: &mut Vec<Sentence>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    sentences.push(Sentence {
        index: sentences.len(),
        text: text.to_string(),
    });
}
