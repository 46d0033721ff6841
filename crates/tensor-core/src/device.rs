//! Compute device identifiers and selection
//!
//! A [`Device`] names where a tensor should live. Parsing a device string is
//! pure; [`DeviceSelector`] additionally checks that the device can actually
//! be used by this build, with the fallback chain
//! CUDA (if available) → Metal (if available) → CPU.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::info;
#[cfg(any(feature = "cuda", feature = "metal"))]
use tracing::warn;

/// Compute target for tensor storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// Host memory (always available)
    #[default]
    Cpu,
    /// NVIDIA CUDA GPU with device index
    Cuda(usize),
    /// Apple Metal GPU with device index
    Metal(usize),
}

impl Device {
    /// Get device family name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda(_) => "cuda",
            Self::Metal(_) => "metal",
        }
    }

    /// Check if this is an accelerator rather than host memory
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, Self::Cpu)
    }

    /// Device index, `None` for the host
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Cpu => None,
            Self::Cuda(idx) | Self::Metal(idx) => Some(*idx),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(idx) => write!(f, "cuda:{}", idx),
            Self::Metal(idx) => write!(f, "metal:{}", idx),
        }
    }
}

impl FromStr for Device {
    type Err = Error;

    /// Accepts: "cpu", "cuda", "cuda:N", "metal", "metal:N"
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let (family, index) = match lowered.split_once(':') {
            Some((family, idx)) => {
                let idx = idx.parse::<usize>().map_err(|_| {
                    Error::configuration("device", format!("Invalid device index in '{}'", s))
                })?;
                (family, idx)
            }
            None => (lowered.as_str(), 0),
        };

        match family {
            "cpu" if !lowered.contains(':') => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            _ => Err(Error::configuration(
                "device",
                format!("Unknown device: {}. Valid options: cpu, cuda[:N], metal[:N]", s),
            )),
        }
    }
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Device selector with automatic fallback
pub struct DeviceSelector;

impl DeviceSelector {
    /// Select the best available device
    ///
    /// Priority: CUDA → Metal → CPU
    pub fn select_best() -> Device {
        #[cfg(feature = "cuda")]
        {
            if Self::cuda_available() {
                info!("CUDA device available, placing tensors on cuda:0");
                return Device::Cuda(0);
            }
            warn!("CUDA feature enabled but no CUDA device available");
        }

        #[cfg(feature = "metal")]
        {
            if Self::metal_available() {
                info!("Metal device available, placing tensors on metal:0");
                return Device::Metal(0);
            }
            warn!("Metal feature enabled but Metal not available");
        }

        info!("Using CPU for decoded tensors (no accelerator available)");
        Device::Cpu
    }

    /// Select device from string configuration, checking availability
    ///
    /// Accepts "auto" plus everything [`Device::from_str`] accepts.
    pub fn from_config(config: &str) -> Result<Device> {
        if config.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::select_best());
        }

        let device: Device = config.parse()?;
        Self::ensure_available(device)?;
        Ok(device)
    }

    /// Fail with [`Error::DeviceInit`] if the device cannot be used by this build
    pub fn ensure_available(device: Device) -> Result<()> {
        match device {
            Device::Cpu => Ok(()),
            Device::Cuda(_) if Self::cuda_available() => Ok(()),
            Device::Metal(_) if Self::metal_available() => Ok(()),
            Device::Cuda(_) if !cfg!(feature = "cuda") => Err(Error::DeviceInit {
                device: device.to_string(),
                message: "CUDA feature not enabled at compile time".to_string(),
            }),
            Device::Metal(_) if !cfg!(feature = "metal") => Err(Error::DeviceInit {
                device: device.to_string(),
                message: "Metal feature not enabled at compile time".to_string(),
            }),
            other => Err(Error::DeviceInit {
                device: other.to_string(),
                message: format!("{} device not available", other.name()),
            }),
        }
    }

    /// Check if CUDA is available
    #[cfg(feature = "cuda")]
    pub fn cuda_available() -> bool {
        candle_core::utils::cuda_is_available()
    }

    #[cfg(not(feature = "cuda"))]
    pub fn cuda_available() -> bool {
        false
    }

    /// Check if Metal is available
    #[cfg(feature = "metal")]
    pub fn metal_available() -> bool {
        candle_core::utils::metal_is_available()
    }

    #[cfg(not(feature = "metal"))]
    pub fn metal_available() -> bool {
        false
    }
}

/// Convert Device to candle_core::Device
#[cfg(feature = "candle")]
impl TryFrom<&Device> for candle_core::Device {
    type Error = Error;

    fn try_from(device: &Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(idx) => candle_core::Device::new_cuda(*idx).map_err(|e| Error::DeviceInit {
                device: device.to_string(),
                message: e.to_string(),
            }),
            Device::Metal(idx) => candle_core::Device::new_metal(*idx).map_err(|e| Error::DeviceInit {
                device: device.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
