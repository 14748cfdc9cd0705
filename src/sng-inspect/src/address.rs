//! Typed target addresses
//!
//! An [`Address<T>`] is a location in the target process tagged with the
//! structure expected there. The tag only steers which layout a read uses;
//! nothing is ever dereferenced without going through a `MemorySource`.

use std::fmt;
use std::marker::PhantomData;

/// Structure markers for [`Address`]
pub mod kind {
    /// Untyped bytes
    pub enum Raw {}
    pub enum MainLoop {}
    pub enum GlobalConfig {}
    pub enum PtrArray {}
    pub enum GString {}
    pub enum LogMessage {}
    pub enum NvTable {}
    pub enum NvEntry {}
    pub enum LogQueue {}
    pub enum QueueFifo {}
    pub enum QueueNode {}
    pub enum LogPipe {}
    pub enum LogDriver {}
    pub enum ExprNode {}
    pub enum ResolvedPaths {}
}

pub struct Address<T> {
    value: usize,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Address<T> {
    pub const fn new(value: usize) -> Self {
        Self {
            value,
            _kind: PhantomData,
        }
    }

    pub const fn null() -> Self {
        Self::new(0)
    }

    pub const fn value(self) -> usize {
        self.value
    }

    pub const fn is_null(self) -> bool {
        self.value == 0
    }

    /// Reinterpret the same location as a different structure
    pub const fn cast<U>(self) -> Address<U> {
        Address::new(self.value)
    }

    /// Untyped address of a field `offset` bytes into the structure
    pub fn field(self, offset: usize) -> Address<kind::Raw> {
        Address::new(self.value.wrapping_add(offset))
    }
}

impl<T> Clone for Address<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Address<T> {}

impl<T> PartialEq for Address<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Address<T> {}

impl<T> fmt::Debug for Address<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.value)
    }
}

impl<T> fmt::Display for Address<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.value)
    }
}

impl<T> fmt::LowerHex for Address<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}
