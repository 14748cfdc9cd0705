//! # sng-inspect
//!
//! Structured memory decoder for a stopped or dumped syslog-ng process.
//!
//! Given a [`MemorySource`] (live process or memory image), a
//! [`SymbolResolver`] and the structure [`Layout`], this library
//! reconstructs:
//! - decoded log message fields ([`payload`])
//! - the buffered messages of a destination queue ([`queue`])
//! - the registry of initialized pipes and drivers ([`pipes`])
//! - a short summary of the instance and its configuration ([`instance`])
//!
//! The target is only ever read, and nothing is cached between calls.
//!
//! ## Example
//!
//! ```no_run
//! use sng_inspect::{
//!     list_pipes, Cancellation, DumpFile, Layout, PipeTable, SymbolTable, Target,
//! };
//! use std::path::Path;
//!
//! # fn main() -> Result<(), sng_inspect::Error> {
//! let dump = DumpFile::open("syslog-ng.img")?;
//! let symbols = SymbolTable::load(Path::new("syslog-ng.nm"))?;
//! let layout = Layout::default();
//! let target = Target::new(&dump, &symbols, &layout);
//!
//! let table = PipeTable::locate(&target)?;
//! for row in list_pipes(&target, &table, &Cancellation::new())? {
//!     println!("{} {:?}", row.index, row.driver);
//! }
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod error;
pub mod instance;
pub mod layout;
pub mod payload;
pub mod pipes;
pub mod queue;
pub mod source;
pub mod symbols;
pub mod target;
pub mod walk;

#[doc(inline)]
pub use address::{kind, Address};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use instance::{config_text, probe, ConfigText, InstanceInfo, ResolvedPaths};
#[doc(inline)]
pub use layout::Layout;
#[doc(inline)]
pub use payload::{
    decode_field, decode_message_field, entry_address_from_top, message_payload, FieldValue,
    NvEntryHeader, PayloadView, StaticField,
};
#[doc(inline)]
pub use pipes::{
    get_pipe, list_pipes, DriverView, PipeKind, PipeRow, PipeTable, PipeView, SourceLocation,
};
#[doc(inline)]
pub use queue::{drain, dump_queue, Subqueue};
#[doc(inline)]
pub use source::{DumpFile, LiveProcess, MemoryRegion, MemorySource};
#[doc(inline)]
pub use symbols::{SymbolResolver, SymbolTable};
#[doc(inline)]
pub use target::{Limits, Target};
#[doc(inline)]
pub use walk::{bounded_walk, Cancellation};
