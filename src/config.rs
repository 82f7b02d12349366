//! Configuration for charnet
//!
//! Every tunable of the pipeline lives here and is passed explicitly to the
//! components that need it. The library never reads configuration from the
//! environment; the CLI maps its flags onto these structs.

use crate::error::{CharnetError, Result};
use crate::ml::DeviceType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of consecutive sentences treated as one co-occurrence window
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Default number of heaviest edges kept in the rendered network
pub const DEFAULT_TOP_K: usize = 200;

/// Default HuggingFace model used for person recognition
pub const DEFAULT_NER_MODEL: &str = "dslim/bert-base-NER";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub segmenter: SegmenterConfig,
    pub ner: NerConfig,
    pub network: NetworkConfig,
    pub render: RenderConfig,
}

/// Sentence segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Tokens that end with a period without ending a sentence (compared case-insensitively)
    pub abbreviations: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        let abbreviations = [
            "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "lt", "col",
            "gen", "capt", "sgt", "no", "vol", "fig", "e.g", "i.e",
        ];
        Self {
            abbreviations: abbreviations.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Which recognition backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// BERT token classification through candle
    Bert,
    /// Dictionary lookup of known character names
    Gazetteer,
}

/// Entity recognition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    pub backend: BackendKind,
    /// HuggingFace hub id of a token classification model
    pub model_name: String,
    /// Local directory holding config.json, tokenizer.json and model.safetensors;
    /// skips the hub download when set
    pub model_dir: Option<PathBuf>,
    /// Directory where downloaded models are cached
    pub cache_dir: Option<PathBuf>,
    /// Maximum number of tokens fed to the model per sentence
    pub max_length: usize,
    pub device: DeviceType,
    /// Newline separated list of character names for the gazetteer backend
    pub gazetteer_path: Option<PathBuf>,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Bert,
            model_name: DEFAULT_NER_MODEL.to_string(),
            model_dir: None,
            cache_dir: None,
            max_length: 512,
            device: DeviceType::Cpu,
            gazetteer_path: None,
        }
    }
}

/// How the co-occurrence window moves across an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowPolicy {
    /// Advance one sentence at a time (overlapping windows)
    Sliding,
    /// Advance a full window at a time (disjoint blocks)
    Tumbling,
}

/// Co-occurrence graph settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub window_size: usize,
    /// Number of heaviest edges retained
    pub top_k: usize,
    pub window_policy: WindowPolicy,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            top_k: DEFAULT_TOP_K,
            window_policy: WindowPolicy::Sliding,
        }
    }
}

/// Visual settings for the rendered network
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: String,
    pub height: String,
    pub background: String,
    pub font_color: String,
    /// Size of the node with the largest incident weight
    pub max_node_size: f64,
    /// Width of the heaviest edge
    pub max_edge_width: f64,
    /// URL of the vis-network script
    pub vis_script_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: "1000px".to_string(),
            height: "700px".to_string(),
            background: "#222222".to_string(),
            font_color: "white".to_string(),
            max_node_size: 50.0,
            max_edge_width: 10.0,
            vis_script_url:
                "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js"
                    .to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CharnetError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.network.window_size == 0 {
            return Err(CharnetError::Config(
                "window_size must be at least 1".to_string(),
            ));
        }
        if self.network.top_k == 0 {
            return Err(CharnetError::Config("top_k must be at least 1".to_string()));
        }
        if self.ner.max_length < 3 {
            return Err(CharnetError::Config(
                "max_length must leave room for special tokens".to_string(),
            ));
        }
        if self.render.max_node_size <= 0.0 || self.render.max_edge_width <= 0.0 {
            return Err(CharnetError::Config(
                "render sizes must be positive".to_string(),
            ));
        }
        if self.ner.backend == BackendKind::Gazetteer && self.ner.gazetteer_path.is_none() {
            return Err(CharnetError::Config(
                "the gazetteer backend needs a gazetteer_path".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(config.network.top_k, DEFAULT_TOP_K);
        assert_eq!(config.network.window_policy, WindowPolicy::Sliding);
        assert_eq!(config.ner.backend, BackendKind::Bert);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.network.window_size = 0;
        assert!(matches!(config.validate(), Err(CharnetError::Config(_))));
    }

    #[test]
    fn test_gazetteer_requires_path() {
        let mut config = Config::default();
        config.ner.backend = BackendKind::Gazetteer;
        assert!(config.validate().is_err());

        config.ner.gazetteer_path = Some(PathBuf::from("names.txt"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "network": { "window_size": 4 } }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.network.window_size, 4);
        assert_eq!(config.network.top_k, DEFAULT_TOP_K);
        assert_eq!(config.ner.model_name, DEFAULT_NER_MODEL);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.network.window_policy = WindowPolicy::Tumbling;
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.network.window_policy, WindowPolicy::Tumbling);
    }
}
