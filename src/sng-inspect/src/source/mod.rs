//! Memory Source Abstraction
//!
//! Everything the decoders know about the target goes through
//! [`MemorySource`]:
//! - Live process attachment via `LiveProcess`
//! - Memory images with a maps sidecar via `DumpFile`
//! - Mock sources for testing

mod dump;
#[cfg(test)]
mod mock;
mod process;
mod region;
mod traits;

pub use dump::DumpFile;
#[cfg(test)]
pub use mock::MockMemorySource;
pub use process::{find_daemon_process, parse_maps, LiveProcess, DAEMON_NAME};
pub use region::MemoryRegion;
pub use traits::MemorySource;
