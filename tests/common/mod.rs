//! Shared helpers for integration tests

#![allow(dead_code)]

use charnet::error::Result;
use charnet::ml::{EntityLabel, NerBackend, RecognizedEntity};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Recognizes a fixed cast word by word and counts how often it is called
pub struct CountingBackend {
    cast: Vec<String>,
    calls: AtomicUsize,
}

impl CountingBackend {
    pub fn new(cast: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            cast: cast.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NerBackend for CountingBackend {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut entities = Vec::new();
        let mut offset = 0;
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if self.cast.iter().any(|name| name == word) {
                entities.push(RecognizedEntity {
                    text: word.to_string(),
                    label: EntityLabel::Person,
                    start: offset,
                    end: offset + word.len(),
                    confidence: 0.99,
                });
            }
            offset += word.len() + 1;
        }
        Ok(entities)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Write a JSON dataset of `(episode, script)` rows into `dir`
pub fn write_dataset(dir: &Path, rows: &[(u32, &str)]) -> std::io::Result<PathBuf> {
    let values: Vec<serde_json::Value> = rows
        .iter()
        .map(|(episode, script)| serde_json::json!({ "episode": episode, "script": script }))
        .collect();

    let path = dir.join("episodes.json");
    std::fs::write(&path, serde_json::Value::from(values).to_string())?;
    Ok(path)
}
