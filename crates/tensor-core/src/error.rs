//! Error types for PixelFeed data items and decoders

use thiserror::Error;

/// Result type alias for PixelFeed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating, decoding or placing data
#[derive(Debug, Error)]
pub enum Error {
    /// The caller passed something the operation cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request is well formed but this build cannot honor it
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The payload could not be decoded by the codec
    #[error("Failed to decode {codec} payload: {message}")]
    Decode {
        codec: String,
        message: String,
    },

    /// Device initialization failed
    #[error("Failed to initialize device '{device}': {message}")]
    DeviceInit {
        device: String,
        message: String,
    },

    /// Configuration error
    #[error("Invalid configuration for '{component}': {message}")]
    Configuration {
        component: String,
        message: String,
    },

    /// Tensor shape does not match its element count
    #[error("Shape error: {0}")]
    Shape(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not supported error
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Create a decode error for the given codec
    pub fn decode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Shape(err.to_string())
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Error> for Error {
    fn from(err: candle_core::Error) -> Self {
        Self::NotSupported(format!("candle: {}", err))
    }
}
