//! Tensor element types

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Numeric element type of a tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

impl DataType {
    /// Every element type, in declaration order
    pub const ALL: [DataType; 7] = [
        DataType::U8,
        DataType::U16,
        DataType::I16,
        DataType::I32,
        DataType::I64,
        DataType::F32,
        DataType::F64,
    ];

    /// Get size in bytes for this data type
    pub fn size_bytes(&self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::I32 | DataType::F32 => 4,
            DataType::I64 | DataType::F64 => 8,
        }
    }

    /// Canonical name, e.g. `float32`
    pub fn name(&self) -> &'static str {
        match self {
            DataType::U8 => "uint8",
            DataType::U16 => "uint16",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::I64 => "int64",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Accepts canonical names, short forms (`f32`, `i16`) and the
    /// `torch.`-prefixed spellings used by Python pipeline configs.
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let name = lowered.strip_prefix("torch.").unwrap_or(&lowered);

        match name {
            "uint8" | "u8" | "byte" => Ok(DataType::U8),
            "uint16" | "u16" => Ok(DataType::U16),
            "int16" | "i16" | "short" => Ok(DataType::I16),
            "int32" | "i32" | "int" => Ok(DataType::I32),
            "int64" | "i64" | "long" => Ok(DataType::I64),
            "float32" | "f32" | "float" => Ok(DataType::F32),
            "float64" | "f64" | "double" => Ok(DataType::F64),
            _ => Err(Error::configuration(
                "dtype",
                format!("Unknown data type: {}", s),
            )),
        }
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("torch.float32".parse::<DataType>().unwrap(), DataType::F32);
        assert_eq!("short".parse::<DataType>().unwrap(), DataType::I16);
        assert_eq!("INT32".parse::<DataType>().unwrap(), DataType::I32);
        assert!("bfloat16".parse::<DataType>().is_err());
    }

    #[test]
    fn test_names_parse_back() {
        for dtype in DataType::ALL {
            assert_eq!(dtype.name().parse::<DataType>().unwrap(), dtype);
        }
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(DataType::U8.size_bytes(), 1);
        assert_eq!(DataType::I16.size_bytes(), 2);
        assert_eq!(DataType::F64.size_bytes(), 8);
    }
}
