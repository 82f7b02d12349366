//! Device selection for NER inference
//!
//! Resolves the configured device type to a candle device. GPU devices are only
//! available when the matching cargo feature is enabled; asking for one that is
//! missing is a backend initialization error.

use crate::error::{CharnetError, Result};
use candle_core::Device;
use serde::{Deserialize, Serialize};

/// Device types supported for ML inference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// CPU inference
    Cpu,
    /// CUDA GPU inference
    Cuda(usize),
    /// Metal GPU inference (macOS)
    Metal,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Cpu => write!(f, "cpu"),
            DeviceType::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
            DeviceType::Metal => write!(f, "metal"),
        }
    }
}

impl std::str::FromStr for DeviceType {
    type Err = CharnetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(DeviceType::Cpu),
            "metal" => Ok(DeviceType::Metal),
            "cuda" => Ok(DeviceType::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(DeviceType::Cuda)
                .ok_or_else(|| CharnetError::Config(format!("Unknown device: {}", s))),
        }
    }
}

/// Create the candle device for the requested type
pub fn resolve_device(device_type: DeviceType) -> Result<Device> {
    let device = match device_type {
        DeviceType::Cpu => Device::Cpu,

        #[cfg(feature = "cuda")]
        DeviceType::Cuda(ordinal) => Device::new_cuda(ordinal)
            .map_err(|e| CharnetError::BackendInit(format!("CUDA device {}: {}", ordinal, e)))?,

        #[cfg(feature = "metal")]
        DeviceType::Metal => Device::new_metal(0)
            .map_err(|e| CharnetError::BackendInit(format!("Metal device: {}", e)))?,

        #[allow(unreachable_patterns)]
        other => {
            return Err(CharnetError::BackendInit(format!(
                "Device {} is not compiled into this build",
                other
            )));
        }
    };

    log::info!("Using device: {}", device_type);
    Ok(device)
}
