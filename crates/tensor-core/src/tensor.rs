//! Dense n-dimensional tensors with device placement
//!
//! Samples are stored in host memory as an [`ndarray::ArrayD`] of the
//! element type. The device a tensor is placed on is recorded alongside the
//! storage so that downstream consumers (e.g. the candle export behind the
//! `candle` feature) know where the data is meant to live.

use crate::device::Device;
use crate::dtype::DataType;
use crate::error::{Error, Result};
use ndarray::{ArrayD, IxDyn};

/// Typed host storage for a tensor
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Run an expression against whichever array a [`TensorData`] holds
macro_rules! with_array {
    ($data:expr, $array:ident => $body:expr) => {
        match $data {
            TensorData::U8($array) => $body,
            TensorData::U16($array) => $body,
            TensorData::I16($array) => $body,
            TensorData::I32($array) => $body,
            TensorData::I64($array) => $body,
            TensorData::F32($array) => $body,
            TensorData::F64($array) => $body,
        }
    };
}

/// Element-wise `as` conversion of one array into the requested type
macro_rules! cast_array {
    ($array:expr, $dtype:expr) => {
        match $dtype {
            DataType::U8 => TensorData::U8($array.mapv(|v| v as u8)),
            DataType::U16 => TensorData::U16($array.mapv(|v| v as u16)),
            DataType::I16 => TensorData::I16($array.mapv(|v| v as i16)),
            DataType::I32 => TensorData::I32($array.mapv(|v| v as i32)),
            DataType::I64 => TensorData::I64($array.mapv(|v| v as i64)),
            DataType::F32 => TensorData::F32($array.mapv(|v| v as f32)),
            DataType::F64 => TensorData::F64($array.mapv(|v| v as f64)),
        }
    };
}

impl TensorData {
    pub fn dtype(&self) -> DataType {
        match self {
            TensorData::U8(_) => DataType::U8,
            TensorData::U16(_) => DataType::U16,
            TensorData::I16(_) => DataType::I16,
            TensorData::I32(_) => DataType::I32,
            TensorData::I64(_) => DataType::I64,
            TensorData::F32(_) => DataType::F32,
            TensorData::F64(_) => DataType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    fn zeros(shape: &[usize], dtype: DataType) -> Self {
        let dim = IxDyn(shape);
        match dtype {
            DataType::U8 => TensorData::U8(ArrayD::zeros(dim)),
            DataType::U16 => TensorData::U16(ArrayD::zeros(dim)),
            DataType::I16 => TensorData::I16(ArrayD::zeros(dim)),
            DataType::I32 => TensorData::I32(ArrayD::zeros(dim)),
            DataType::I64 => TensorData::I64(ArrayD::zeros(dim)),
            DataType::F32 => TensorData::F32(ArrayD::zeros(dim)),
            DataType::F64 => TensorData::F64(ArrayD::zeros(dim)),
        }
    }

    fn cast(&self, dtype: DataType) -> Self {
        if self.dtype() == dtype {
            return self.clone();
        }
        with_array!(self, a => cast_array!(a, dtype))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Scalar types a [`Tensor`] can hold
pub trait Element: Copy + Send + Sync + 'static + sealed::Sealed {
    /// Element type tag for this scalar
    const DTYPE: DataType;

    #[doc(hidden)]
    fn wrap(array: ArrayD<Self>) -> TensorData;

    #[doc(hidden)]
    fn view(data: &TensorData) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const DTYPE: DataType = DataType::$variant;

            fn wrap(array: ArrayD<Self>) -> TensorData {
                TensorData::$variant(array)
            }

            fn view(data: &TensorData) -> Option<&ArrayD<Self>> {
                match data {
                    TensorData::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(u8, U8);
impl_element!(u16, U16);
impl_element!(i16, I16);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(f32, F32);
impl_element!(f64, F64);

/// Dense tensor with element type, device placement and pinning state
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: TensorData,
    device: Device,
    pinned: bool,
}

impl Tensor {
    /// Wrap an existing array, placed on the host
    pub fn from_array<T: Element>(array: ArrayD<T>) -> Self {
        Self {
            data: T::wrap(array),
            device: Device::Cpu,
            pinned: false,
        }
    }

    /// Build a tensor from a flat row-major buffer
    pub fn from_shape_vec<T: Element>(shape: &[usize], values: Vec<T>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(Error::Shape(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        let array = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Ok(Self::from_array(array))
    }

    /// Zero-filled host tensor
    pub fn zeros(shape: &[usize], dtype: DataType) -> Self {
        Self {
            data: TensorData::zeros(shape, dtype),
            device: Device::Cpu,
            pinned: false,
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements
    pub fn numel(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Whether the host storage is page-locked for faster device transfer
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn size_in_bytes(&self) -> usize {
        self.numel() * self.dtype().size_bytes()
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn into_data(self) -> TensorData {
        self.data
    }

    /// Typed view of the samples, `None` if `T` is not the element type
    pub fn as_array<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::view(&self.data)
    }

    /// Typed view that reports a dtype mismatch as an error
    pub fn try_as_array<T: Element>(&self) -> Result<&ArrayD<T>> {
        self.as_array::<T>().ok_or_else(|| {
            Error::invalid_argument(format!(
                "tensor holds {} elements, requested {}",
                self.dtype(),
                T::DTYPE
            ))
        })
    }

    /// Convert every element to `dtype` using `as` cast semantics
    pub fn to_dtype(&self, dtype: DataType) -> Self {
        Self {
            data: self.data.cast(dtype),
            device: self.device,
            pinned: self.pinned,
        }
    }

    /// Place the tensor on `device`
    ///
    /// Moving onto an accelerator drops the pinned flag, pinning only
    /// applies to host storage.
    pub fn to_device(self, device: Device) -> Self {
        if device == self.device {
            return self;
        }
        let pinned = self.pinned && !device.is_accelerator();
        Self {
            data: self.data,
            device,
            pinned,
        }
    }

    /// Mark host storage as pinned
    pub fn pin_memory(self) -> Result<Self> {
        if self.device.is_accelerator() {
            return Err(Error::invalid_argument(format!(
                "cannot pin memory of a tensor placed on {}",
                self.device
            )));
        }
        Ok(Self {
            pinned: true,
            ..self
        })
    }

    /// Export to a candle tensor on the matching candle device
    ///
    /// candle has no 16/32-bit signed or 16-bit unsigned storage, so those
    /// widen to int64 / uint32.
    #[cfg(feature = "candle")]
    pub fn to_candle(&self) -> Result<candle_core::Tensor> {
        let device = candle_core::Device::try_from(&self.device)?;
        let shape = self.shape().to_vec();
        let tensor = match &self.data {
            TensorData::U8(a) => {
                candle_core::Tensor::from_vec(a.iter().copied().collect::<Vec<u8>>(), shape, &device)?
            }
            TensorData::U16(a) => candle_core::Tensor::from_vec(
                a.iter().map(|&v| v as u32).collect::<Vec<u32>>(),
                shape,
                &device,
            )?,
            TensorData::I16(a) => candle_core::Tensor::from_vec(
                a.iter().map(|&v| v as i64).collect::<Vec<i64>>(),
                shape,
                &device,
            )?,
            TensorData::I32(a) => candle_core::Tensor::from_vec(
                a.iter().map(|&v| v as i64).collect::<Vec<i64>>(),
                shape,
                &device,
            )?,
            TensorData::I64(a) => {
                candle_core::Tensor::from_vec(a.iter().copied().collect::<Vec<i64>>(), shape, &device)?
            }
            TensorData::F32(a) => {
                candle_core::Tensor::from_vec(a.iter().copied().collect::<Vec<f32>>(), shape, &device)?
            }
            TensorData::F64(a) => {
                candle_core::Tensor::from_vec(a.iter().copied().collect::<Vec<f64>>(), shape, &device)?
            }
        };
        Ok(tensor)
    }
}

impl<T: Element> From<ArrayD<T>> for Tensor {
    fn from(array: ArrayD<T>) -> Self {
        Self::from_array(array)
    }
}
