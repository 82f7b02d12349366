//! Error types for charnet
//!
//! This module provides error handling for every pipeline stage: dataset loading,
//! sentence segmentation, entity recognition, cache storage, graph building and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for charnet operations
#[derive(Error, Debug)]
pub enum CharnetError {
    /// A required column is missing from the loaded dataset
    #[error("Schema error: the dataset must contain a '{column}' column")]
    Schema { column: String },

    /// The entity recognition backend could not be loaded
    #[error("Recognition backend failed to initialize: {0}")]
    BackendInit(String),

    /// A cache file exists but its entity column cannot be reparsed
    #[error("Cache at {} is corrupt ({reason}); delete it to recompute", path.display())]
    CacheCorruption { path: PathBuf, reason: String },

    /// Dataset loading errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Text processing errors
    #[error("Text processing error: {0}")]
    TextProcessing(String),

    /// Machine learning model errors
    #[error("ML model error: {0}")]
    MachineLearning(String),

    /// Database/storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Graph rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Candle ML framework errors
    #[error("Candle ML error: {0}")]
    Candle(#[from] candle_core::Error),
}

/// Result type alias for charnet operations
pub type Result<T> = std::result::Result<T, CharnetError>;
