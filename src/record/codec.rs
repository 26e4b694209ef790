//! Field codec
//!
//! Width-aware little-endian encoding of length and key fields.

use crate::config::FieldWidth;
use crate::error::Result;
use crate::medium::StorageMedium;

/// Read a 1- or 2-byte little-endian field at `addr`
pub(crate) fn read_field<M: StorageMedium>(
    medium: &M,
    addr: usize,
    width: FieldWidth,
) -> Result<usize> {
    let low = medium.read_byte(addr)? as usize;
    match width {
        FieldWidth::One => Ok(low),
        FieldWidth::Two => {
            let high = medium.read_byte(addr + 1)? as usize;
            Ok(low | (high << 8))
        }
    }
}

/// Write a 1- or 2-byte little-endian field at `addr`
///
/// The high byte goes first, so for values below 256 the final write of the
/// low byte is the only one that changes a zeroed field.
pub(crate) fn write_field<M: StorageMedium>(
    medium: &mut M,
    addr: usize,
    width: FieldWidth,
    value: usize,
) -> Result<()> {
    debug_assert!(value <= width.max_value());
    if width == FieldWidth::Two {
        medium.write_if_different(addr + 1, (value >> 8) as u8)?;
    }
    medium.write_if_different(addr, (value & 0xFF) as u8)
}
