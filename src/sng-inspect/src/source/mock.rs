//! Mock Memory Source
//!
//! A flat, writable memory image for testing the decoders.

use super::{MemoryRegion, MemorySource};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mock memory source backed by one contiguous buffer
pub struct MockMemorySource {
    /// Raw memory data (contiguous, starting at base_address)
    pub data: Vec<u8>,
    /// Base virtual address for the data
    pub base_address: usize,
    pub regions: Vec<MemoryRegion>,
    reads: AtomicUsize,
}

impl MockMemorySource {
    /// Create a new mock with data at given base address
    pub fn new(data: Vec<u8>, base_address: usize) -> Self {
        let end = base_address + data.len();
        Self {
            data,
            base_address,
            regions: vec![MemoryRegion {
                start: base_address,
                end,
                perms: "rw-p".to_string(),
                offset: 0,
                path: None,
            }],
            reads: AtomicUsize::new(0),
        }
    }

    /// Create a zero-filled mock of `size` bytes
    pub fn zeroed(base_address: usize, size: usize) -> Self {
        Self::new(vec![0; size], base_address)
    }

    /// Number of `read_bytes` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_bytes(&mut self, address: usize, bytes: &[u8]) {
        let offset = address - self.base_address;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn write_u8(&mut self, address: usize, value: u8) {
        self.write_bytes(address, &[value]);
    }

    pub fn write_u32(&mut self, address: usize, value: u32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_i32(&mut self, address: usize, value: i32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_ptr(&mut self, address: usize, value: usize) {
        self.write_bytes(address, &(value as u64).to_le_bytes());
    }

    /// Write a NUL-terminated string
    pub fn write_cstring(&mut self, address: usize, value: &str) {
        self.write_bytes(address, value.as_bytes());
        self.write_u8(address + value.len(), 0);
    }
}

impl MemorySource for MockMemorySource {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if address < self.base_address {
            return Err(Error::access(
                address,
                size,
                format!("below base {:#x}", self.base_address),
            ));
        }

        let offset = address - self.base_address;
        if offset + size > self.data.len() {
            return Err(Error::access(
                address,
                size,
                format!("exceeds data size {}", self.data.len()),
            ));
        }

        Ok(self.data[offset..offset + size].to_vec())
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_read_ptr() {
        let mut source = MockMemorySource::zeroed(0x1000, 16);
        source.write_ptr(0x1008, 0x0000_0001_0000_1000);

        assert_eq!(source.read_ptr(0x1008).unwrap(), 0x0000_0001_0000_1000);
        assert_eq!(source.read_u32(0x1008).unwrap(), 0x1000);
    }

    #[test]
    fn test_mock_source_read_cstring() {
        let data = b"Hello\0World\0padding".to_vec();
        let source = MockMemorySource::new(data, 0x1000);

        assert_eq!(source.read_cstring(0x1000, 10).unwrap(), "Hello");
        assert_eq!(source.read_cstring(0x1006, 10).unwrap(), "World");
    }

    #[test]
    fn test_read_cstring_near_end_of_data() {
        // Terminator is 3 bytes before the end, well inside one chunk
        let source = MockMemorySource::new(b"abc\0".to_vec(), 0x1000);
        assert_eq!(source.read_cstring(0x1000, 4096).unwrap(), "abc");
    }

    #[test]
    fn test_read_cstring_unterminated_fails() {
        let source = MockMemorySource::new(b"abc".to_vec(), 0x1000);
        assert!(source.read_cstring(0x1000, 4096).is_err());
    }

    #[test]
    fn test_read_cstring_over_max_len_is_not_truncated() {
        let source = MockMemorySource::new(b"abcdef\0".to_vec(), 0x1000);

        let err = source.read_cstring(0x1000, 3).unwrap_err();
        assert!(matches!(
            err,
            Error::StringTooLong {
                address: 0x1000,
                limit: 3
            }
        ));
        assert_eq!(source.read_cstring(0x1000, 7).unwrap(), "abcdef");
    }

    #[test]
    fn test_read_cstring_long_string_across_chunks() {
        let mut data = vec![b'x'; 1000];
        data.push(0);
        let source = MockMemorySource::new(data, 0x1000);

        assert_eq!(source.read_cstring(0x1000, 4096).unwrap().len(), 1000);
        assert!(source.read_cstring(0x1000, 999).is_err());
    }

    #[test]
    fn test_mock_source_read_out_of_bounds() {
        let source = MockMemorySource::new(vec![0x41, 0x42, 0x43, 0x44], 0x1000);

        assert!(source.read_bytes(0x1002, 10).is_err());
        assert!(source.read_bytes(0x500, 4).is_err());
        assert_eq!(source.read_count(), 2);
    }
}
