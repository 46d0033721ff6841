//! Integration tests for data items, memory blocks and tensors

use pixelfeed_core::{Data, DataType, Device, DeviceSelector, MemoryBlock, Tensor};
use std::io::Write;

#[test]
fn test_memory_block_from_path() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"\x89PNG\r\n\x1a\nrest")?;
    file.flush()?;

    let block = MemoryBlock::from_path(file.path())?;
    assert_eq!(block.len(), 12);
    assert_eq!(&block[..4], b"\x89PNG");
    Ok(())
}

#[test]
fn test_memory_block_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MemoryBlock::from_path(dir.path().join("missing.png")).unwrap_err();
    assert!(matches!(err, pixelfeed_core::Error::Io(_)));
}

#[test]
fn test_tensor_item_roundtrip_through_data() {
    let tensor = Tensor::from_shape_vec(&[2, 2], vec![1i32, 2, 3, 4])
        .unwrap()
        .to_device(Device::Metal(0));
    let item = Data::from(tensor.clone());

    assert!(!item.is_memory_block());
    let back = item.into_tensor().unwrap();
    assert_eq!(back, tensor);
    assert_eq!(back.device(), Device::Metal(0));
    assert_eq!(back.dtype(), DataType::I32);
}

#[test]
fn test_device_selector_never_fails_for_auto() {
    let device = DeviceSelector::from_config("AUTO").unwrap();
    assert!(DeviceSelector::ensure_available(device).is_ok());
}
