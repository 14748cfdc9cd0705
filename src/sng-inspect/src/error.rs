//! Error types for memory decoding

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required symbol is absent from the symbol table
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// A read against target memory failed
    #[error("Failed to read {size} bytes at {address:#x}: {reason}")]
    MemoryAccess {
        address: usize,
        size: usize,
        reason: String,
    },

    /// A pointer that must be valid was null
    #[error("Null {what} pointer")]
    NullPointer { what: &'static str },

    /// Caller-supplied index outside `[0, len)`
    #[error("Invalid index {index} (valid range is 0..{len})")]
    InvalidIndex { index: usize, len: usize },

    /// A string runs past the length cap without ending
    #[error("String at {address:#x} exceeds the {limit} byte limit")]
    StringTooLong { address: usize, limit: usize },

    /// A queue length counter exceeds the iteration cap
    #[error("Queue length implausible: {length} exceeds limit of {limit}")]
    QueueLengthImplausible { length: usize, limit: usize },

    /// The operator aborted a traversal
    #[error("Interrupted")]
    Interrupted,

    /// A symbol listing could not be parsed
    #[error("Malformed symbol table at line {line}: {reason}")]
    SymbolTable { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn access(address: usize, size: usize, reason: impl Into<String>) -> Self {
        Error::MemoryAccess {
            address,
            size,
            reason: reason.into(),
        }
    }

    /// True for failures that come from reading target memory
    pub fn is_memory_access(&self) -> bool {
        matches!(self, Error::MemoryAccess { .. } | Error::NullPointer { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
