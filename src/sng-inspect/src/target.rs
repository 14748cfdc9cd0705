//! Typed access to target memory
//!
//! [`Target`] binds a memory source, a symbol resolver and the structure
//! layouts for the duration of one query. All decoders read through it.

use crate::address::{kind, Address};
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::source::MemorySource;
use crate::symbols::SymbolResolver;

/// Default cap on queue traversal
pub const DEFAULT_MAX_QUEUE_LENGTH: usize = 1_000_000;

/// Default cap on a NUL-terminated string read
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024;

/// Default cap on a length-prefixed text such as a configuration `GString`
pub const DEFAULT_MAX_TEXT_LEN: usize = 64 * 1024 * 1024;

/// Bounds applied to reads driven by untrusted target data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_queue_length: usize,
    pub max_string_len: usize,
    pub max_text_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
        }
    }
}

pub struct Target<'a> {
    source: &'a dyn MemorySource,
    symbols: &'a dyn SymbolResolver,
    layout: &'a Layout,
    limits: Limits,
}

impl<'a> Target<'a> {
    pub fn new(
        source: &'a dyn MemorySource,
        symbols: &'a dyn SymbolResolver,
        layout: &'a Layout,
    ) -> Self {
        Self {
            source,
            symbols,
            layout,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn resolve_symbol<T>(&self, name: &str) -> Result<Address<T>> {
        self.symbols
            .resolve(name)
            .map(Address::new)
            .ok_or_else(|| Error::SymbolNotFound(name.to_string()))
    }

    /// Read a pointer field
    pub fn read_ptr<T, U>(&self, base: Address<T>, offset: usize) -> Result<Address<U>> {
        let ptr = self.source.read_ptr(base.field(offset).value())?;
        Ok(Address::new(ptr))
    }

    /// Read a pointer field that must not be null
    pub fn read_non_null<T, U>(
        &self,
        base: Address<T>,
        offset: usize,
        what: &'static str,
    ) -> Result<Address<U>> {
        let ptr: Address<U> = self.read_ptr(base, offset)?;
        if ptr.is_null() {
            return Err(Error::NullPointer { what });
        }
        Ok(ptr)
    }

    pub fn read_u8<T>(&self, base: Address<T>, offset: usize) -> Result<u8> {
        self.source.read_u8(base.field(offset).value())
    }

    pub fn read_u32<T>(&self, base: Address<T>, offset: usize) -> Result<u32> {
        self.source.read_u32(base.field(offset).value())
    }

    pub fn read_u64<T>(&self, base: Address<T>, offset: usize) -> Result<u64> {
        self.source.read_u64(base.field(offset).value())
    }

    pub fn read_i32<T>(&self, base: Address<T>, offset: usize) -> Result<i32> {
        self.source.read_i32(base.field(offset).value())
    }

    pub fn read_bytes<T>(&self, address: Address<T>, len: usize) -> Result<Vec<u8>> {
        self.source.read_bytes(address.value(), len)
    }

    /// Read a NUL-terminated string starting at `address`
    ///
    /// A string longer than `Limits::max_string_len` is an error, not a
    /// truncated value.
    pub fn read_string<T>(&self, address: Address<T>) -> Result<String> {
        self.source
            .read_cstring(address.value(), self.limits.max_string_len)
    }

    /// Follow a `gchar *` field; a null pointer reads as `None`
    pub fn read_string_field<T>(&self, base: Address<T>, offset: usize) -> Result<Option<String>> {
        let ptr: Address<kind::Raw> = self.read_ptr(base, offset)?;
        if ptr.is_null() {
            return Ok(None);
        }
        self.read_string(ptr).map(Some)
    }
}
