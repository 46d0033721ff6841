//! Input extraction and output placement helpers shared by the decoders

use pixelfeed_core::{Data, Device, Error, MemoryBlock, Result, Tensor};

/// Validates decoder inputs and places decoded tensors
pub struct DataConverter;

impl DataConverter {
    /// Borrow the memory block carried by `item`
    ///
    /// Fails with [`Error::InvalidArgument`] for any other variant.
    pub fn extract_memory_block<'a>(item: &'a Data, stage: &str) -> Result<&'a MemoryBlock> {
        item.as_memory_block().ok_or_else(|| {
            Error::invalid_argument(format!(
                "The input data of `{}` must be of type `memory_block`, but is of type `{}` instead.",
                stage,
                item.data_type()
            ))
        })
    }

    /// Like [`Self::extract_memory_block`], also rejecting empty blocks
    pub fn extract_non_empty_block<'a>(item: &'a Data, stage: &str) -> Result<&'a MemoryBlock> {
        let block = Self::extract_memory_block(item, stage)?;
        if block.is_empty() {
            return Err(Error::invalid_argument(
                "The input memory block has zero length and cannot be decoded.",
            ));
        }
        Ok(block)
    }

    /// Move a decoded tensor to `device` and pin it if it stays on the host
    pub fn place_tensor(tensor: Tensor, device: Option<Device>, pin_memory: bool) -> Result<Tensor> {
        let tensor = match device {
            Some(device) => tensor.to_device(device),
            None => tensor,
        };

        if pin_memory && !tensor.device().is_accelerator() {
            tensor.pin_memory()
        } else {
            Ok(tensor)
        }
    }
}
