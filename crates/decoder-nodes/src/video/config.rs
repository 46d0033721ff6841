//! Configuration for the video decoder

use pixelfeed_core::{DataType, Device};
use serde::{Deserialize, Serialize};

/// Options for [`super::VideoDecoder`]
///
/// Memory pinning is not part of these options; it is passed to the
/// decoder constructor on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct VideoDecoderOptions {
    /// Device to place decoded frames on. Unset keeps them in host memory.
    #[schemars(with = "Option<String>")]
    pub device: Option<Device>,

    /// Element type of the frame tensors (float32, int32 or int16).
    /// Unset means float32.
    #[schemars(with = "Option<String>")]
    pub dtype: Option<DataType>,
}

impl VideoDecoderOptions {
    pub fn with_device(self, device: Option<Device>) -> Self {
        Self { device, ..self }
    }

    pub fn device(&self) -> Option<Device> {
        self.device
    }

    pub fn with_dtype(self, dtype: Option<DataType>) -> Self {
        Self { dtype, ..self }
    }

    pub fn dtype(&self) -> Option<DataType> {
        self.dtype
    }
}

/// Factory parameters: the options plus the separate pin-memory flag
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct VideoDecoderParams {
    #[serde(flatten)]
    pub options: VideoDecoderOptions,

    /// Pin the host memory of decoded frames
    #[serde(alias = "pinMemory")]
    pub pin_memory: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_dtype_returns_new_value() {
        let base = VideoDecoderOptions::default();
        let short = base.with_dtype(Some(DataType::I16));

        assert_eq!(base.dtype(), None);
        assert_eq!(short.dtype(), Some(DataType::I16));
        assert_eq!(short.with_device(Some(Device::Cpu)).dtype(), Some(DataType::I16));
    }

    #[test]
    fn test_params_flatten_options() {
        let params: VideoDecoderParams =
            serde_json::from_str(r#"{"dtype": "torch.int32", "pinMemory": true}"#).unwrap();
        assert_eq!(params.options.dtype, Some(DataType::I32));
        assert!(params.pin_memory);
        assert_eq!(params.options.device, None);
    }
}
