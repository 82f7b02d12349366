//! Machine Learning module for charnet
//!
//! This module provides the named entity recognition backends used by the
//! entity extractor: a pure Rust BERT token classifier running on candle, and a
//! dictionary matcher for known casts.

pub mod backend;
pub mod bert;
pub mod device;
pub mod gazetteer;
pub mod models;
pub mod text;

// Re-export main types and functions
pub use backend::{EntityLabel, NerBackend, RecognizedEntity};
pub use bert::BertNerBackend;
pub use device::{DeviceType, resolve_device};
pub use gazetteer::GazetteerBackend;
pub use models::ModelManager;
pub use text::{TextProcessor, TokenizedText};

use crate::config::{BackendKind, NerConfig};
use crate::error::{CharnetError, Result};
use std::sync::Arc;

/// Construct the backend selected in `config`.
///
/// Called once at startup; the returned backend is shared read-only by every
/// extraction call. Failures are fatal [`CharnetError::BackendInit`] errors.
pub fn load_backend(config: &NerConfig) -> Result<Arc<dyn NerBackend>> {
    log::info!("Initializing {:?} recognition backend", config.backend);

    let backend: Arc<dyn NerBackend> = match config.backend {
        BackendKind::Bert => Arc::new(BertNerBackend::load(config)?),
        BackendKind::Gazetteer => {
            let path = config.gazetteer_path.as_ref().ok_or_else(|| {
                CharnetError::BackendInit("the gazetteer backend needs a names file".to_string())
            })?;
            Arc::new(GazetteerBackend::from_file(path)?)
        }
    };

    log::info!("Recognition backend '{}' ready", backend.name());
    Ok(backend)
}
