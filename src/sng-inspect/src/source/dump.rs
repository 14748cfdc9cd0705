//! Dump File Memory Source
//!
//! Memory source for a frozen memory image plus a maps sidecar that places
//! each captured region in the image.

use super::{MemoryRegion, MemorySource};
use crate::error::{Error, Result};

use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Memory dump file source
///
/// The image holds the captured regions back to back; the sidecar lists
/// them as `0xSTART 0xEND SIZE FILE_OFFSET` lines (or in `/proc/<pid>/maps`
/// form, in which case the offset column is the position in the image).
pub struct DumpFile {
    mmap: Mmap,
    regions: Vec<MemoryRegion>,
}

impl DumpFile {
    /// Open a memory image, reading regions from `<path>.maps`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let maps_path = path.with_extension("maps");
        Self::open_with_maps(path, &maps_path)
    }

    /// Open a memory image with an explicit maps file
    pub fn open_with_maps(dump_path: &Path, maps_path: &Path) -> Result<Self> {
        let file = File::open(dump_path)?;

        // SAFETY: the image is opened read-only and is not expected to be
        // modified while mapped.
        let mmap = unsafe { Mmap::map(&file) }?;

        let regions = Self::parse_maps_file(maps_path)?;

        tracing::debug!(
            path = %dump_path.display(),
            bytes = mmap.len(),
            regions = regions.len(),
            "opened memory image"
        );

        Ok(DumpFile { mmap, regions })
    }

    fn parse_maps_file(path: &Path) -> Result<Vec<MemoryRegion>> {
        let reader = BufReader::new(File::open(path)?);
        let mut regions = Vec::new();

        for line in reader.lines() {
            if let Some(region) = MemoryRegion::parse_maps_line(&line?) {
                regions.push(region);
            }
        }

        Ok(regions)
    }

    /// Convert virtual address to image offset
    fn va_to_offset(&self, va: usize) -> Option<(usize, &MemoryRegion)> {
        let region = self.find_region(va)?;
        let file_offset = region.offset + (va - region.start);
        (file_offset < self.mmap.len()).then_some((file_offset, region))
    }
}

impl MemorySource for DumpFile {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        let (offset, region) = self
            .va_to_offset(address)
            .ok_or_else(|| Error::access(address, size, "address not captured in dump"))?;

        if address + size > region.end || offset + size > self.mmap.len() {
            return Err(Error::access(address, size, "read crosses end of region"));
        }

        Ok(self.mmap[offset..offset + size].to_vec())
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }
}
