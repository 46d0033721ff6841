//! Generic data items flowing through decoding pipelines

use crate::memory::MemoryBlock;
use crate::tensor::Tensor;
use std::collections::BTreeMap;
use std::fmt;

/// Ordered string-keyed map of data items
pub type DataDict = BTreeMap<String, Data>;

/// A single item handed from one pipeline stage to the next
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Tensor(Tensor),
    MemoryBlock(MemoryBlock),
    List(Vec<Data>),
    Dict(DataDict),
}

/// Variant tag of a [`Data`] item, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Bool,
    Int,
    Float,
    String,
    Tensor,
    MemoryBlock,
    List,
    Dict,
}

impl DataKind {
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Bool => "bool",
            DataKind::Int => "int",
            DataKind::Float => "float",
            DataKind::String => "string",
            DataKind::Tensor => "tensor",
            DataKind::MemoryBlock => "memory_block",
            DataKind::List => "list",
            DataKind::Dict => "dict",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Data {
    pub fn data_type(&self) -> DataKind {
        match self {
            Data::Bool(_) => DataKind::Bool,
            Data::Int(_) => DataKind::Int,
            Data::Float(_) => DataKind::Float,
            Data::String(_) => DataKind::String,
            Data::Tensor(_) => DataKind::Tensor,
            Data::MemoryBlock(_) => DataKind::MemoryBlock,
            Data::List(_) => DataKind::List,
            Data::Dict(_) => DataKind::Dict,
        }
    }

    pub fn is_memory_block(&self) -> bool {
        matches!(self, Data::MemoryBlock(_))
    }

    pub fn as_memory_block(&self) -> Option<&MemoryBlock> {
        match self {
            Data::MemoryBlock(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Data::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    pub fn into_tensor(self) -> Option<Tensor> {
        match self {
            Data::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Data::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DataDict> {
        match self {
            Data::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Look up `key` if this item is a dict
    pub fn get(&self, key: &str) -> Option<&Data> {
        self.as_dict().and_then(|dict| dict.get(key))
    }
}

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Bool(value)
    }
}

impl From<i64> for Data {
    fn from(value: i64) -> Self {
        Data::Int(value)
    }
}

impl From<f64> for Data {
    fn from(value: f64) -> Self {
        Data::Float(value)
    }
}

impl From<String> for Data {
    fn from(value: String) -> Self {
        Data::String(value)
    }
}

impl From<&str> for Data {
    fn from(value: &str) -> Self {
        Data::String(value.to_string())
    }
}

impl From<Tensor> for Data {
    fn from(value: Tensor) -> Self {
        Data::Tensor(value)
    }
}

impl From<MemoryBlock> for Data {
    fn from(value: MemoryBlock) -> Self {
        Data::MemoryBlock(value)
    }
}

impl From<Vec<Data>> for Data {
    fn from(value: Vec<Data>) -> Self {
        Data::List(value)
    }
}

impl From<DataDict> for Data {
    fn from(value: DataDict) -> Self {
        Data::Dict(value)
    }
}
