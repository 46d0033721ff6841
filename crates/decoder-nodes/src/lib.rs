//! Decoder Transforms for PixelFeed Pipelines
//!
//! This crate turns encoded memory blocks into tensors. Each decoder is a
//! configured [`Transform`]: build it once from its options, then apply it
//! to every item flowing through a pipeline.
//!
//! # Features
//!
//! - `ffmpeg` - Decode video through FFmpeg (ac-ffmpeg)
//! - `candle` - Export decoded tensors to candle
//! - `cuda` - NVIDIA GPU detection
//! - `metal` - Apple GPU detection
//!
//! # Example
//!
//! ```ignore
//! use pixelfeed_decoders::{ImageDecoderOptions, PngDecoder, Transform};
//!
//! let decoder = PngDecoder::new(ImageDecoderOptions::default().with_pinned_memory(true));
//! let output = decoder.apply(Data::from(MemoryBlock::from_path("frame.png")?))?;
//! let image = output.get("image").and_then(Data::as_tensor);
//! ```

pub mod pipeline;
pub mod png;
pub mod registry;
pub mod transform;
pub mod video;

mod convert;

pub use convert::DataConverter;
pub use pipeline::{read_sequence, DataPipeline, PipelineBuilder};
pub use png::{ImageDecoderOptions, PngDecoder, PngDecoderFactory};
pub use registry::{
    collect_registered_transforms, register_decoders, RegisteredTransform, TransformFactory, TransformRegistry,
};
pub use transform::{from_fn, FnTransform, Transform};
pub use video::{VideoCodecBackend, VideoDecoder, VideoDecoderFactory, VideoDecoderOptions};

pub use pixelfeed_core::{Data, DataType, Device, Error, MemoryBlock, Result, Tensor};
