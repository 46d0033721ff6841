//! Video decoder
//!
//! Decodes encoded video containers into per-stream frame tensors of shape
//! `[num_frames, height, width, 3]`. The element type is fixed when the
//! decoder is built and must be float32, int32 or int16.

pub mod backend;
mod config;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;

pub use backend::{default_backend, ContainerFormat, ContainerSniffer, DecodedStream, VideoCodecBackend, NO_PTS};
pub use config::{VideoDecoderOptions, VideoDecoderParams};

use crate::convert::DataConverter;
use crate::registry::{parse_params, schema_value, RegisteredTransform, TransformFactory};
use crate::transform::Transform;
use pixelfeed_core::{Data, DataDict, DataType, Error, Result, Tensor};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Element types frame tensors may be produced in
pub const SUPPORTED_DTYPES: [DataType; 3] = [DataType::F32, DataType::I32, DataType::I16];

/// Decodes video memory blocks into frame tensors
pub struct VideoDecoder {
    options: VideoDecoderOptions,
    dtype: DataType,
    pin_memory: bool,
    backend: Arc<dyn VideoCodecBackend>,
}

impl VideoDecoder {
    /// Create a decoder using the best backend this build offers
    ///
    /// # Returns
    /// * `Ok(Self)` - Configured decoder
    /// * `Err(Error::NotSupported)` - Requested dtype is not float32, int32 or int16
    pub fn new(options: VideoDecoderOptions, pin_memory: bool) -> Result<Self> {
        Self::with_backend(options, pin_memory, default_backend())
    }

    /// Create a decoder on an explicit codec backend
    pub fn with_backend(
        options: VideoDecoderOptions,
        pin_memory: bool,
        backend: Arc<dyn VideoCodecBackend>,
    ) -> Result<Self> {
        let dtype = options.dtype.unwrap_or(DataType::F32);
        if !SUPPORTED_DTYPES.contains(&dtype) {
            return Err(Error::not_supported(format!(
                "`video_decoder` supports only `float32`, `int32`, and `int16` data types, but `{}` was requested.",
                dtype
            )));
        }

        info!(
            dtype = %dtype,
            device = ?options.device,
            pin_memory,
            backend = backend.name(),
            "Created video decoder"
        );

        Ok(Self {
            options,
            dtype,
            pin_memory,
            backend,
        })
    }

    pub fn options(&self) -> &VideoDecoderOptions {
        &self.options
    }

    /// Effective element type of the frame tensors
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn is_pinned_memory(&self) -> bool {
        self.pin_memory
    }

    fn stream_to_data(&self, stream: DecodedStream) -> Result<Data> {
        let num_frames = stream.num_frames();
        if num_frames == 0 {
            return Err(Error::decode(
                "video",
                format!("stream {} produced no frames", stream.stream_index),
            ));
        }

        let frames = Tensor::from_array(stream.frames.into_dyn()).to_dtype(self.dtype);
        let frames = DataConverter::place_tensor(frames, self.options.device, self.pin_memory)?;
        let pts = Tensor::from_shape_vec(&[num_frames], stream.pts)?;

        let mut output = DataDict::new();
        output.insert("all_video_frames".to_string(), Data::Tensor(frames));
        output.insert("frame_pts".to_string(), Data::Tensor(pts));
        output.insert("width".to_string(), Data::Int(stream.width as i64));
        output.insert("height".to_string(), Data::Int(stream.height as i64));
        output.insert("num_frames".to_string(), Data::Int(num_frames as i64));
        Ok(Data::Dict(output))
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("options", &self.options)
            .field("dtype", &self.dtype)
            .field("pin_memory", &self.pin_memory)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Transform for VideoDecoder {
    fn name(&self) -> &str {
        "video_decoder"
    }

    fn apply(&self, item: Data) -> Result<Data> {
        let block = DataConverter::extract_non_empty_block(&item, self.name())?;

        let streams = self.backend.decode(block)?;
        if streams.is_empty() {
            return Err(Error::decode("video", "payload contains no video stream"));
        }

        let mut video = DataDict::new();
        for stream in streams {
            let index = stream.stream_index;
            debug!(
                stream = index,
                frames = stream.num_frames(),
                width = stream.width,
                height = stream.height,
                "Converting decoded stream"
            );
            video.insert(index.to_string(), self.stream_to_data(stream)?);
        }

        let mut output = DataDict::new();
        output.insert("video".to_string(), Data::Dict(video));
        Ok(Data::Dict(output))
    }
}

/// Builds [`VideoDecoder`]s from JSON parameters
pub struct VideoDecoderFactory;

impl TransformFactory for VideoDecoderFactory {
    fn create(&self, params: &Value) -> Result<Box<dyn Transform>> {
        let params: VideoDecoderParams = parse_params(self.transform_type(), params)?;
        Ok(Box::new(VideoDecoder::new(params.options, params.pin_memory)?))
    }

    fn transform_type(&self) -> &str {
        "video_decoder"
    }

    fn config_schema(&self) -> Value {
        schema_value(schemars::schema_for!(VideoDecoderParams))
    }
}

fn video_decoder_factory() -> Arc<dyn TransformFactory> {
    Arc::new(VideoDecoderFactory)
}

inventory::submit! {
    RegisteredTransform::new(video_decoder_factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;
    use pixelfeed_core::{Device, MemoryBlock};

    /// Backend returning fixed frames regardless of payload
    struct FixedFrames {
        frames: usize,
    }

    impl VideoCodecBackend for FixedFrames {
        fn name(&self) -> &str {
            "fixed"
        }

        fn decode(&self, _payload: &MemoryBlock) -> Result<Vec<DecodedStream>> {
            let frames = Array4::from_shape_fn((self.frames, 2, 3, 3), |(n, y, x, c)| (n * 10 + y * 3 + x + c) as u8);
            Ok(vec![DecodedStream {
                stream_index: 0,
                width: 3,
                height: 2,
                frames,
                pts: (0..self.frames as i64).map(|i| i * 512).collect(),
            }])
        }
    }

    fn payload() -> Data {
        Data::from(MemoryBlock::from(vec![1u8, 2, 3]))
    }

    #[test]
    fn test_default_dtype_is_float32() {
        let decoder = VideoDecoder::new(VideoDecoderOptions::default(), false).unwrap();
        assert_eq!(decoder.dtype(), DataType::F32);
        assert!(!decoder.is_pinned_memory());
    }

    #[test]
    fn test_converts_frames_to_requested_dtype() {
        let options = VideoDecoderOptions::default().with_dtype(Some(DataType::I16));
        let decoder = VideoDecoder::with_backend(options, true, Arc::new(FixedFrames { frames: 2 })).unwrap();

        let output = decoder.apply(payload()).unwrap();
        let stream = output.get("video").and_then(|v| v.get("0")).unwrap();
        let frames = stream.get("all_video_frames").and_then(Data::as_tensor).unwrap();

        assert_eq!(frames.shape(), &[2, 2, 3, 3]);
        assert_eq!(frames.dtype(), DataType::I16);
        assert!(frames.is_pinned());
        assert_eq!(frames.as_array::<i16>().unwrap()[[1, 0, 0, 0]], 10);

        let pts = stream.get("frame_pts").and_then(Data::as_tensor).unwrap();
        assert_eq!(pts.as_array::<i64>().unwrap().as_slice().unwrap(), &[0, 512]);
        assert_eq!(stream.get("num_frames").and_then(Data::as_int), Some(2));
    }

    #[test]
    fn test_frames_follow_configured_device() {
        let options = VideoDecoderOptions::default().with_device(Some(Device::Cuda(1)));
        let decoder = VideoDecoder::with_backend(options, true, Arc::new(FixedFrames { frames: 1 })).unwrap();

        let output = decoder.apply(payload()).unwrap();
        let frames = output
            .get("video")
            .and_then(|v| v.get("0"))
            .and_then(|s| s.get("all_video_frames"))
            .and_then(Data::as_tensor)
            .unwrap();
        assert_eq!(frames.device(), Device::Cuda(1));
        assert!(!frames.is_pinned());
    }

    #[test]
    fn test_empty_stream_is_decode_error() {
        let decoder =
            VideoDecoder::with_backend(VideoDecoderOptions::default(), false, Arc::new(FixedFrames { frames: 0 }))
                .unwrap();
        let err = decoder.apply(payload()).unwrap_err();
        assert!(err.is_decode());
    }
}
