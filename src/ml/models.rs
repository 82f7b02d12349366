//! Model management for charnet NER backends
//!
//! This module handles downloading and caching token classification models
//! from the HuggingFace Hub, and resolving local model directories.

use crate::error::{CharnetError, Result};
use std::path::{Path, PathBuf};

/// Files fetched for a token classification model; missing optional ones only warn
const MODEL_FILES: &[&str] = &[
    "config.json",
    "tokenizer.json",
    "tokenizer_config.json",
    "vocab.txt", // For BERT checkpoints without a fast tokenizer
    "model.safetensors",
];

/// Model manager for downloading and caching models
pub struct ModelManager {
    /// Cache directory for models
    cache_dir: PathBuf,
}

impl ModelManager {
    /// Create new model manager
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".cache")
                .join("charnet")
                .join("models")
        });

        std::fs::create_dir_all(&cache_dir)?;

        Ok(Self { cache_dir })
    }

    /// Get cache directory
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Directory a hub model is cached in
    pub fn model_dir(&self, hub_id: &str) -> PathBuf {
        self.cache_dir.join(sanitize_model_name(hub_id))
    }

    /// Return a directory holding the model files, downloading them if needed
    pub fn fetch_model(&self, hub_id: &str) -> Result<PathBuf> {
        let model_dir = self.model_dir(hub_id);
        if validate_model_dir(&model_dir) {
            log::info!("Model '{}' already cached at {:?}", hub_id, model_dir);
            return Ok(model_dir);
        }

        std::fs::create_dir_all(&model_dir)?;
        log::info!("Downloading model '{}' from HuggingFace Hub", hub_id);

        for file_name in MODEL_FILES {
            match download_file(hub_id, file_name, &model_dir) {
                Ok(()) => log::debug!("Downloaded {}/{}", hub_id, file_name),
                Err(e) => log::warn!("Failed to download {}/{}: {}", hub_id, file_name, e),
            }
        }

        if !validate_model_dir(&model_dir) {
            return Err(CharnetError::MachineLearning(format!(
                "Model '{}' is missing config, weights or vocabulary after download",
                hub_id
            )));
        }

        Ok(model_dir)
    }
}

/// Download a single file from HuggingFace Hub into `target_dir`
fn download_file(repo_id: &str, filename: &str, target_dir: &Path) -> Result<()> {
    use hf_hub::api::sync::Api;

    let target_path = target_dir.join(filename);
    if target_path.exists() && target_path.metadata()?.len() > 0 {
        return Ok(());
    }

    let api = Api::new()
        .map_err(|e| CharnetError::MachineLearning(format!("Failed to create HF API: {}", e)))?;
    let repo = api.model(repo_id.to_string());

    let downloaded_path = repo.get(filename).map_err(|e| {
        CharnetError::MachineLearning(format!("Failed to download {}: {}", filename, e))
    })?;

    std::fs::copy(&downloaded_path, &target_path)
        .map_err(|e| CharnetError::MachineLearning(format!("Failed to copy file: {}", e)))?;
    Ok(())
}

/// A usable model directory has a config, safetensors weights, and a tokenizer
/// or WordPiece vocabulary
pub fn validate_model_dir(model_dir: &Path) -> bool {
    let present = |name: &str| {
        let path = model_dir.join(name);
        path.metadata().map(|m| m.len() > 0).unwrap_or(false)
    };

    present("config.json")
        && present("model.safetensors")
        && (present("tokenizer.json") || present("vocab.txt"))
}

fn sanitize_model_name(name: &str) -> String {
    name.replace(['/', '\\', ':'], "--")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_model_manager_creation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ModelManager::new(Some(temp_dir.path().to_path_buf())).unwrap();

        assert!(manager.cache_dir().exists());
        assert_eq!(
            manager.model_dir("dslim/bert-base-NER"),
            temp_dir.path().join("dslim--bert-base-NER")
        );
    }

    #[test]
    fn test_validate_model_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        assert!(!validate_model_dir(dir));

        std::fs::write(dir.join("config.json"), "{}").unwrap();
        std::fs::write(dir.join("model.safetensors"), "x").unwrap();
        assert!(!validate_model_dir(dir));

        std::fs::write(dir.join("vocab.txt"), "[PAD]\n").unwrap();
        assert!(validate_model_dir(dir));
    }

    #[test]
    fn test_cached_model_skips_download() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ModelManager::new(Some(temp_dir.path().to_path_buf())).unwrap();

        let model_dir = manager.model_dir("local/ner-model");
        std::fs::create_dir_all(&model_dir).unwrap();
        for file in ["config.json", "model.safetensors", "tokenizer.json"] {
            std::fs::write(model_dir.join(file), "{}").unwrap();
        }

        assert_eq!(manager.fetch_model("local/ner-model").unwrap(), model_dir);
    }

    #[test]
    fn test_sanitize_model_name() {
        assert_eq!(sanitize_model_name("dslim/bert-base-NER"), "dslim--bert-base-NER");
    }
}
