//! Immutable byte buffers holding encoded payloads

use crate::error::Result;
use bytes::Bytes;
use std::ops::Deref;
use std::path::Path;

/// Immutable, cheaply clonable block of encoded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemoryBlock {
    bytes: Bytes,
}

impl MemoryBlock {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Copy a slice into a new block
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Read a whole file into a block
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), len = data.len(), "Read memory block");
        Ok(Self::from(data))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero-copy sub-block, `None` if `range` is reversed or past the end
    pub fn slice(&self, range: std::ops::Range<usize>) -> Option<Self> {
        if range.start > range.end || range.end > self.bytes.len() {
            return None;
        }
        Some(Self {
            bytes: self.bytes.slice(range),
        })
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl Deref for MemoryBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for MemoryBlock {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for MemoryBlock {
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<&'static [u8]> for MemoryBlock {
    fn from(data: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(data),
        }
    }
}

impl From<Bytes> for MemoryBlock {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_bytes() {
        let block = MemoryBlock::from(vec![1u8, 2, 3, 4]);
        let clone = block.clone();
        assert_eq!(block.as_slice().as_ptr(), clone.as_slice().as_ptr());
        assert_eq!(clone.len(), 4);
    }

    #[test]
    fn test_slice_and_empty() {
        let block = MemoryBlock::from(&b"abcdef"[..]);
        assert_eq!(&*block.slice(1..3).unwrap(), b"bc");
        assert!(MemoryBlock::default().is_empty());
        assert!(block.slice(2..2).unwrap().is_empty());
        assert!(block.slice(6..6).unwrap().is_empty());
    }

    #[test]
    fn test_slice_out_of_range_is_none() {
        let block = MemoryBlock::from(&b"abcdef"[..]);
        assert!(block.slice(4..7).is_none());
        assert!(block.slice(10..12).is_none());
        let (start, end) = (3, 1);
        assert!(block.slice(start..end).is_none());
    }
}
