//! Configuration for the PNG decoder

use pixelfeed_core::Device;
use serde::{Deserialize, Serialize};

/// Options for [`super::PngDecoder`]
///
/// A plain value: build it with a struct literal or chain the `with_*`
/// helpers. The helpers take `self` by value and the type is `Copy`, so the
/// value they were called on is left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct ImageDecoderOptions {
    /// Device to place the decoded image on (`cpu`, `cuda:N`, `metal:N`).
    /// Unset keeps it in host memory.
    #[schemars(with = "Option<String>")]
    pub device: Option<Device>,

    /// Pin the host memory of the decoded image
    #[serde(alias = "pinMemory")]
    pub pin_memory: bool,
}

impl ImageDecoderOptions {
    pub fn with_device(self, device: Option<Device>) -> Self {
        Self { device, ..self }
    }

    pub fn device(&self) -> Option<Device> {
        self.device
    }

    pub fn with_pinned_memory(self, pin_memory: bool) -> Self {
        Self { pin_memory, ..self }
    }

    pub fn is_pinned_memory(&self) -> bool {
        self.pin_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_leave_original_untouched() {
        let base = ImageDecoderOptions::default();
        let on_gpu = base.with_device(Some(Device::Cuda(1)));
        let pinned = base.with_pinned_memory(true);

        assert_eq!(base.device(), None);
        assert!(!base.is_pinned_memory());
        assert_eq!(on_gpu.device(), Some(Device::Cuda(1)));
        assert!(!on_gpu.is_pinned_memory());
        assert!(pinned.is_pinned_memory());
        assert_eq!(pinned.device(), None);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let opts: ImageDecoderOptions = serde_json::from_str(r#"{"pinMemory": true}"#).unwrap();
        assert!(opts.pin_memory);
        assert_eq!(opts.device, None);

        let opts: ImageDecoderOptions = serde_json::from_str(r#"{"device": "cuda:2"}"#).unwrap();
        assert_eq!(opts.device, Some(Device::Cuda(2)));
        assert!(!opts.pin_memory);
    }
}
