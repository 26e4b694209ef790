//! Storage Medium Module
//!
//! The byte-level primitive the record store is built on.
//!
//! ## Responsibilities
//! - Synchronous, blocking single-byte reads
//! - Wear-reducing writes: a write to a byte that already holds the value
//!   must not touch the physical cell
//!
//! The store assumes exclusive, non-reentrant access to the medium. There is
//! no internal locking; callers with several execution contexts (threads,
//! interrupt handlers) must serialize access themselves.

mod file;
mod memory;

pub use file::FileMedium;
pub use memory::InMemoryMedium;

use crate::error::Result;

/// A byte-addressable, byte-rewritable non-volatile memory
pub trait StorageMedium {
    /// Total number of addressable bytes
    fn len(&self) -> usize;

    /// Whether the medium has no addressable bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one byte
    fn read_byte(&self, addr: usize) -> Result<u8>;

    /// Write one byte, skipping the physical write when it already holds `value`
    fn write_if_different(&mut self, addr: usize, value: u8) -> Result<()>;

    /// Read `len` consecutive bytes starting at `addr`
    fn read_bytes(&self, addr: usize, len: usize) -> Result<Vec<u8>> {
        (addr..addr + len).map(|a| self.read_byte(a)).collect()
    }

    /// Write `data` starting at `addr`, lowest address first
    fn update_bytes(&mut self, addr: usize, data: &[u8]) -> Result<()> {
        for (i, &b) in data.iter().enumerate() {
            self.write_if_different(addr + i, b)?;
        }
        Ok(())
    }
}

impl<M: StorageMedium + ?Sized> StorageMedium for &mut M {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_byte(&self, addr: usize) -> Result<u8> {
        (**self).read_byte(addr)
    }

    fn write_if_different(&mut self, addr: usize, value: u8) -> Result<()> {
        (**self).write_if_different(addr, value)
    }
}
