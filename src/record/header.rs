//! Region header
//!
//! Detects and writes the "CAS" magic at the start of a region.

use crate::config::FieldWidth;
use crate::error::Result;
use crate::medium::StorageMedium;

use super::codec::write_field;
use super::{HEADER_SIZE, MAGIC};

/// Whether the region starting at `start` carries the magic sequence
pub(crate) fn has_header<M: StorageMedium>(medium: &M, start: usize) -> Result<bool> {
    for (i, &expected) in MAGIC.iter().enumerate() {
        if medium.read_byte(start + 1 + i)? != expected {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Format the region: empty chain, reserved zero, then the magic
///
/// The magic goes last so a region only reads as formatted once its
/// sentinel is in place; an interrupted format is redone by the next begin.
/// Byte 0 of the region is left untouched.
pub(crate) fn format_header<M: StorageMedium>(
    medium: &mut M,
    start: usize,
    length_width: FieldWidth,
) -> Result<()> {
    write_field(medium, start + HEADER_SIZE, length_width, 0)?;
    medium.write_if_different(start + 1 + MAGIC.len(), 0)?;
    medium.update_bytes(start + 1, MAGIC)
}
