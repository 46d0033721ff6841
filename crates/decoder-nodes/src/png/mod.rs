//! PNG image decoder
//!
//! Decodes PNG-encoded memory blocks into `[height, width, channels]`
//! tensors. Palette and sub-byte grayscale images are expanded to 8 bits per
//! sample; 16-bit images keep their depth and decode to `uint16`.

mod config;

pub use config::ImageDecoderOptions;

use crate::convert::DataConverter;
use crate::registry::{parse_params, schema_value, RegisteredTransform, TransformFactory};
use crate::transform::Transform;
use ::image::{DynamicImage, ImageFormat};
use pixelfeed_core::{Data, DataDict, Error, Result, Tensor};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// The 8-byte signature every PNG stream starts with
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// PNG color-type codes of the decoded sample layout
const COLOR_TYPE_GRAY: i64 = 0;
const COLOR_TYPE_RGB: i64 = 2;
const COLOR_TYPE_GRAY_ALPHA: i64 = 4;
const COLOR_TYPE_RGBA: i64 = 6;

/// Samples and layout of a decoded PNG
struct DecodedImage {
    tensor: Tensor,
    bit_depth: i64,
    color_type: i64,
    channels: i64,
}

/// Decodes PNG memory blocks into image tensors
#[derive(Debug, Clone, Default)]
pub struct PngDecoder {
    options: ImageDecoderOptions,
}

impl PngDecoder {
    pub fn new(options: ImageDecoderOptions) -> Self {
        info!(
            device = ?options.device,
            pin_memory = options.pin_memory,
            "Created PNG decoder"
        );
        Self { options }
    }

    pub fn options(&self) -> &ImageDecoderOptions {
        &self.options
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        if !bytes.starts_with(&PNG_SIGNATURE) {
            return Err(Error::decode("png", "missing PNG signature"));
        }

        let image = ::image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| Error::decode("png", e.to_string()))?;

        let height = image.height() as usize;
        let width = image.width() as usize;

        let (tensor, bit_depth, color_type, channels) = match image {
            DynamicImage::ImageLuma8(buf) => (hwc(height, width, 1, buf.into_raw())?, 8, COLOR_TYPE_GRAY, 1),
            DynamicImage::ImageLumaA8(buf) => (hwc(height, width, 2, buf.into_raw())?, 8, COLOR_TYPE_GRAY_ALPHA, 2),
            DynamicImage::ImageRgb8(buf) => (hwc(height, width, 3, buf.into_raw())?, 8, COLOR_TYPE_RGB, 3),
            DynamicImage::ImageRgba8(buf) => (hwc(height, width, 4, buf.into_raw())?, 8, COLOR_TYPE_RGBA, 4),
            DynamicImage::ImageLuma16(buf) => (hwc(height, width, 1, buf.into_raw())?, 16, COLOR_TYPE_GRAY, 1),
            DynamicImage::ImageLumaA16(buf) => (hwc(height, width, 2, buf.into_raw())?, 16, COLOR_TYPE_GRAY_ALPHA, 2),
            DynamicImage::ImageRgb16(buf) => (hwc(height, width, 3, buf.into_raw())?, 16, COLOR_TYPE_RGB, 3),
            DynamicImage::ImageRgba16(buf) => (hwc(height, width, 4, buf.into_raw())?, 16, COLOR_TYPE_RGBA, 4),
            other => {
                return Err(Error::not_supported(format!(
                    "PNG decoded to unsupported sample layout {:?}",
                    other.color()
                )))
            }
        };

        Ok(DecodedImage {
            tensor,
            bit_depth,
            color_type,
            channels,
        })
    }
}

fn hwc<T: pixelfeed_core::Element>(height: usize, width: usize, channels: usize, samples: Vec<T>) -> Result<Tensor> {
    Tensor::from_shape_vec(&[height, width, channels], samples)
}

impl Transform for PngDecoder {
    fn name(&self) -> &str {
        "png_decoder"
    }

    fn apply(&self, item: Data) -> Result<Data> {
        let block = DataConverter::extract_non_empty_block(&item, self.name())?;
        let decoded = self.decode(block.as_slice())?;

        let shape = decoded.tensor.shape().to_vec();
        let image = DataConverter::place_tensor(decoded.tensor, self.options.device, self.options.pin_memory)?;

        debug!(
            height = shape[0],
            width = shape[1],
            channels = decoded.channels,
            bit_depth = decoded.bit_depth,
            device = %image.device(),
            "Decoded PNG image"
        );

        let mut output = DataDict::new();
        output.insert("bit_depth".to_string(), Data::Int(decoded.bit_depth));
        output.insert("color_type".to_string(), Data::Int(decoded.color_type));
        output.insert("channels".to_string(), Data::Int(decoded.channels));
        output.insert("height".to_string(), Data::Int(shape[0] as i64));
        output.insert("width".to_string(), Data::Int(shape[1] as i64));
        output.insert("image".to_string(), Data::Tensor(image));
        Ok(Data::Dict(output))
    }
}

/// Builds [`PngDecoder`]s from JSON parameters
pub struct PngDecoderFactory;

impl TransformFactory for PngDecoderFactory {
    fn create(&self, params: &Value) -> Result<Box<dyn Transform>> {
        let options: ImageDecoderOptions = parse_params(self.transform_type(), params)?;
        Ok(Box::new(PngDecoder::new(options)))
    }

    fn transform_type(&self) -> &str {
        "png_decoder"
    }

    fn config_schema(&self) -> Value {
        schema_value(schemars::schema_for!(ImageDecoderOptions))
    }
}

fn png_decoder_factory() -> Arc<dyn TransformFactory> {
    Arc::new(PngDecoderFactory)
}

inventory::submit! {
    RegisteredTransform::new(png_decoder_factory)
}
