//! Log message payload decoding
//!
//! A message's name-value pairs live in an `NVTable`. Statically indexed
//! fields are located through `static_entries`, whose offsets count
//! backward from the table's top (`base + size`). Each offset lands on an
//! `NVEntry` that is either unset, indirect (a slice of another field) or
//! direct, with `name NUL value NUL` stored inline.

use crate::address::{kind, Address};
use crate::error::{Error, Result};
use crate::target::Target;
use std::fmt;

/// Statically indexed message fields, numbered as in the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticField {
    Host = 1,
    HostFrom = 2,
    Message = 3,
    Program = 4,
    Pid = 5,
    MsgId = 6,
    Source = 7,
    LegacyMsgHdr = 8,
}

impl StaticField {
    pub const ALL: [StaticField; 8] = [
        StaticField::Host,
        StaticField::HostFrom,
        StaticField::Message,
        StaticField::Program,
        StaticField::Pid,
        StaticField::MsgId,
        StaticField::Source,
        StaticField::LegacyMsgHdr,
    ];

    /// Handle number (1-based)
    pub fn number(self) -> usize {
        self as usize
    }

    /// Position in `static_entries`
    pub fn index(self) -> usize {
        self.number() - 1
    }

    pub fn name(self) -> &'static str {
        match self {
            StaticField::Host => "HOST",
            StaticField::HostFrom => "HOST_FROM",
            StaticField::Message => "MESSAGE",
            StaticField::Program => "PROGRAM",
            StaticField::Pid => "PID",
            StaticField::MsgId => "MSGID",
            StaticField::Source => "SOURCE",
            StaticField::LegacyMsgHdr => "LEGACY_MSGHDR",
        }
    }

    /// Look up a field by name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for StaticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message's name-value table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadView {
    pub base: Address<kind::NvTable>,
    /// Declared byte length of the table
    pub size: u32,
    /// Per-field offsets, measured back from `base + size`
    pub static_offsets: Vec<u32>,
}

impl PayloadView {
    /// Read the table header and its static offsets
    pub fn read(target: &Target<'_>, table: Address<kind::NvTable>) -> Result<Self> {
        let layout = &target.layout().nv_table;
        let size = target.read_u32(table, layout.size)?;

        let count = layout.static_entry_count;
        let raw = target.read_bytes(table.field(layout.static_entries), count * 4)?;
        let static_offsets = raw
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            base: table,
            size,
            static_offsets,
        })
    }

    /// One past the last byte of the table
    pub fn top(&self) -> usize {
        self.base.value().wrapping_add(self.size as usize)
    }
}

/// Address of the entry stored `offset` bytes below the table's top
pub fn entry_address_from_top(payload: &PayloadView, offset: u32) -> Address<kind::NvEntry> {
    Address::new(payload.top().wrapping_sub(offset as usize))
}

/// Flags and name length at the start of an `NVEntry`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvEntryHeader {
    pub unset: bool,
    pub indirect: bool,
    pub name_len: u8,
}

impl NvEntryHeader {
    pub fn read(target: &Target<'_>, entry: Address<kind::NvEntry>) -> Result<Self> {
        let layout = &target.layout().nv_entry;
        let flags = target.read_u8(entry, layout.flags)?;
        let name_len = target.read_u8(entry, layout.name_len)?;

        Ok(Self {
            unset: flags & layout.unset_mask != 0,
            indirect: flags & layout.indirect_mask != 0,
            name_len,
        })
    }
}

/// Decoded value of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The field holds no value
    Unset,
    /// The value references another field; not resolved
    Indirect,
    Direct(String),
}

impl FieldValue {
    pub fn as_direct(&self) -> Option<&str> {
        match self {
            FieldValue::Direct(s) => Some(s),
            _ => None,
        }
    }
}

/// Decode the field stored at `static_offsets[field_index]`
///
/// An index outside the table's static offsets is reported as
/// `InvalidIndex`. An offset of zero means the field was never stored.
pub fn decode_field(
    target: &Target<'_>,
    payload: &PayloadView,
    field_index: usize,
) -> Result<FieldValue> {
    let offset = *payload
        .static_offsets
        .get(field_index)
        .ok_or(Error::InvalidIndex {
            index: field_index,
            len: payload.static_offsets.len(),
        })?;

    if offset == 0 {
        return Ok(FieldValue::Unset);
    }

    let entry = entry_address_from_top(payload, offset);
    let header = NvEntryHeader::read(target, entry)?;

    if header.unset {
        return Ok(FieldValue::Unset);
    }

    if header.indirect {
        return Ok(FieldValue::Indirect);
    }

    // Skip the inline name and its terminator
    let value_offset = target.layout().nv_entry.data + header.name_len as usize + 1;
    let value = target.read_string(entry.field(value_offset))?;

    Ok(FieldValue::Direct(value))
}

/// Read the payload table of a `LogMessage`
pub fn message_payload(
    target: &Target<'_>,
    message: Address<kind::LogMessage>,
) -> Result<PayloadView> {
    let table =
        target.read_non_null(message, target.layout().log_message.payload, "message payload")?;
    PayloadView::read(target, table)
}

/// Decode one static field of a `LogMessage`
pub fn decode_message_field(
    target: &Target<'_>,
    message: Address<kind::LogMessage>,
    field: StaticField,
) -> Result<FieldValue> {
    let payload = message_payload(target, message)?;
    decode_field(target, &payload, field.index())
}
