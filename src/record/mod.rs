//! Record Module
//!
//! Persisted layout of a region.
//!
//! ## Region Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (5 bytes)                                             │
//! │   Reserved (1) | 'C' 'A' 'S' (3) | 0x00 (1)                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record chain (packed, no gaps)                               │
//! │   [Length: W_L][Key: W_K][Data: Length - W_L - W_K]          │
//! │   ... repeated ...                                           │
//! │   [Length = 0: W_L]   ← sentinel, end of the live chain      │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Free space (unallocated, up to the region end)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Length and key are little-endian; their widths (W_L, W_K) are 1 or 2
//! bytes and fixed for the life of a region. Length counts the whole record,
//! including its own field and the key.

mod chain;
mod codec;
mod header;

pub use chain::{RecordInfo, RecordIter};
pub(crate) use codec::write_field;
pub(crate) use header::{format_header, has_header};

/// Magic bytes marking a formatted region (at region offsets 1..4)
pub const MAGIC: &[u8; 3] = b"CAS";

/// Header size: Reserved (1) + Magic (3) + Reserved zero (1)
pub const HEADER_SIZE: usize = 5;

/// Size of one list slot
pub const SLOT_SIZE: usize = 4;

/// Slot value marking an empty or deleted list slot
pub const TOMBSTONE: u32 = u32::MAX;

/// Number of slots in a freshly allocated list group
pub const SLOTS_PER_GROUP: usize = 3;
