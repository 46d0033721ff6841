//! PixelFeed core data model
//!
//! Generic data items, immutable memory blocks, dense tensors with device
//! placement, and the shared error type used by the decoder transforms.
//!
//! # Features
//!
//! - `candle` - Export tensors as `candle_core::Tensor`
//! - `cuda` - NVIDIA GPU detection via candle
//! - `metal` - Apple GPU detection via candle

pub mod data;
pub mod device;
pub mod dtype;
pub mod error;
pub mod memory;
pub mod tensor;

pub use data::{Data, DataDict, DataKind};
pub use device::{Device, DeviceSelector};
pub use dtype::DataType;
pub use error::{Error, Result};
pub use memory::MemoryBlock;
pub use tensor::{Element, Tensor, TensorData};
