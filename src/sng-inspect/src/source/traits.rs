//! Memory Source Trait
//!
//! Core abstraction for reading memory from a live process or a dump.

use super::MemoryRegion;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LE};

/// Bytes fetched per read while scanning for a string terminator
const CSTRING_CHUNK: usize = 64;

/// Trait for reading memory from various sources (live process, dump file, etc.)
pub trait MemorySource: Send + Sync {
    /// Read bytes from a virtual address
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>>;

    /// Get the list of memory regions
    fn regions(&self) -> &[MemoryRegion];

    /// Read a u8 from memory
    fn read_u8(&self, address: usize) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    /// Read a u32 from memory
    fn read_u32(&self, address: usize) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(LE::read_u32(&bytes))
    }

    /// Read an i32 from memory
    fn read_i32(&self, address: usize) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(LE::read_i32(&bytes))
    }

    /// Read a u64 from memory
    fn read_u64(&self, address: usize) -> Result<u64> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(LE::read_u64(&bytes))
    }

    /// Read a pointer (usize) from memory
    fn read_ptr(&self, address: usize) -> Result<usize> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(LE::read_u64(&bytes) as usize)
    }

    /// Read a null-terminated string of at most `max_len` bytes
    ///
    /// Reads in small chunks so a string near the end of a mapping does not
    /// fail just because a fixed-size read would cross the boundary. No
    /// terminator within `max_len` bytes is `Error::StringTooLong`.
    fn read_cstring(&self, address: usize, max_len: usize) -> Result<String> {
        let mut out = Vec::new();
        let mut cursor = address;

        while out.len() < max_len {
            let want = CSTRING_CHUNK.min(max_len - out.len());
            let chunk = match self.read_bytes(cursor, want) {
                Ok(chunk) => chunk,
                // Fall back to a single byte at a time near the end of a mapping
                Err(e) if want > 1 => match self.read_bytes(cursor, 1) {
                    Ok(byte) => byte,
                    Err(_) => return Err(e),
                },
                Err(e) => return Err(e),
            };

            if let Some(end) = chunk.iter().position(|&b| b == 0) {
                out.extend_from_slice(&chunk[..end]);
                return Ok(String::from_utf8_lossy(&out).to_string());
            }

            cursor += chunk.len();
            out.extend_from_slice(&chunk);
        }

        Err(Error::StringTooLong {
            address,
            limit: max_len,
        })
    }

    /// Find a region containing the given address
    fn find_region(&self, address: usize) -> Option<&MemoryRegion> {
        self.regions().iter().find(|r| r.contains(address))
    }
}
