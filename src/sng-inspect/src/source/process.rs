//! Live Process Memory Source
//!
//! Reads from a running (and, for consistent results, stopped) syslog-ng.

use super::{MemoryRegion, MemorySource};
use crate::error::{Error, Result};

use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use sysinfo::System;

/// Name fragment used to locate the daemon when no PID is given
pub const DAEMON_NAME: &str = "syslog-ng";

/// An attached target process
pub struct LiveProcess {
    pub pid: u32,
    pub handle: ProcessHandle,
    pub exe_path: PathBuf,
    pub maps: Vec<MemoryRegion>,
}

// SAFETY: the handle is a plain pid on Linux and a process-wide HANDLE on
// Windows; both may be used from any thread.
unsafe impl Send for LiveProcess {}
unsafe impl Sync for LiveProcess {}

impl MemorySource for LiveProcess {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        match self.find_region(address) {
            None => return Err(Error::access(address, size, "address not mapped")),
            Some(region) if !region.is_readable() => {
                return Err(Error::access(
                    address,
                    size,
                    format!(
                        "region {:#x}-{:#x} is not readable ({})",
                        region.start, region.end, region.perms
                    ),
                ));
            }
            Some(_) => {}
        }

        let mut buffer = vec![0u8; size];
        self.handle
            .copy_address(address, &mut buffer)
            .map_err(|e| Error::access(address, size, e.to_string()))?;
        Ok(buffer)
    }

    fn regions(&self) -> &[MemoryRegion] {
        &self.maps
    }
}

impl LiveProcess {
    /// Attach to a process by PID, or to the largest running syslog-ng
    pub fn attach(pid: Option<u32>) -> Result<Self> {
        let pid = match pid {
            Some(pid) => pid,
            None => find_daemon_process()?,
        };

        let handle = (pid as process_memory::Pid).try_into_process_handle()?;
        let maps = parse_maps(pid)?;
        let exe_path = std::fs::read_link(format!("/proc/{}/exe", pid))
            .unwrap_or_else(|_| PathBuf::from("unknown"));

        tracing::info!(pid, exe = %exe_path.display(), regions = maps.len(), "attached");

        Ok(LiveProcess {
            pid,
            handle,
            exe_path,
            maps,
        })
    }

    /// Lowest mapped address of the main executable
    pub fn image_base(&self) -> Option<usize> {
        let exe = self.exe_path.to_string_lossy();
        self.maps
            .iter()
            .filter(|r| r.path.as_deref() == Some(exe.as_ref()))
            .map(|r| r.start)
            .min()
    }
}

/// Find the running daemon, preferring the process with the most memory
pub fn find_daemon_process() -> Result<u32> {
    let mut system = System::new_all();
    system.refresh_all();

    let mut candidates: Vec<(u32, u64)> = system
        .processes()
        .values()
        .filter(|p| p.name().to_string_lossy().contains(DAEMON_NAME))
        .map(|p| (p.pid().as_u32(), p.memory()))
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    match candidates.first() {
        Some((pid, memory)) => {
            tracing::debug!(pid, memory, "found {} process", DAEMON_NAME);
            Ok(*pid)
        }
        None => Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} process not found. Is it running?", DAEMON_NAME),
        ))),
    }
}

/// Parse /proc/pid/maps to get memory regions
pub fn parse_maps(pid: u32) -> Result<Vec<MemoryRegion>> {
    let reader = BufReader::new(File::open(format!("/proc/{}/maps", pid))?);
    let mut regions = Vec::new();

    for line in reader.lines() {
        if let Some(region) = MemoryRegion::parse_maps_line(&line?) {
            regions.push(region);
        }
    }

    Ok(regions)
}
