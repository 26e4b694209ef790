//! In-memory storage medium
//!
//! RAM-backed stand-in for an EEPROM, used by tests and benchmarks.

use crate::error::{RecordError, Result};

use super::StorageMedium;

/// Value of an erased EEPROM cell
pub const ERASED_BYTE: u8 = 0xFF;

/// A `Vec<u8>`-backed medium
///
/// Counts physical writes (writes that actually changed a byte) so tests can
/// check the wear-reduction contract, and can be given a write budget after
/// which every physical write fails. The budget simulates power loss in the
/// middle of a multi-byte update.
#[derive(Debug, Clone)]
pub struct InMemoryMedium {
    data: Vec<u8>,
    physical_writes: u64,
    write_budget: Option<u64>,
}

impl InMemoryMedium {
    /// Create an erased medium of `len` bytes
    pub fn new(len: usize) -> Self {
        Self::with_data(vec![ERASED_BYTE; len])
    }

    /// Create a medium holding pre-existing bytes (e.g. a saved image)
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data,
            physical_writes: 0,
            write_budget: None,
        }
    }

    /// Current contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of writes that changed a byte
    pub fn physical_writes(&self) -> u64 {
        self.physical_writes
    }

    /// Allow only `n` more physical writes; the next one fails
    pub fn fail_after(&mut self, n: u64) {
        self.write_budget = Some(self.physical_writes + n);
    }

    /// Remove any write budget
    pub fn clear_fault(&mut self) {
        self.write_budget = None;
    }

    fn check_addr(&self, addr: usize) -> Result<()> {
        if addr >= self.data.len() {
            return Err(RecordError::Medium(format!(
                "Address {} beyond medium of {} bytes",
                addr,
                self.data.len()
            )));
        }
        Ok(())
    }
}

impl StorageMedium for InMemoryMedium {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn read_byte(&self, addr: usize) -> Result<u8> {
        self.check_addr(addr)?;
        Ok(self.data[addr])
    }

    fn write_if_different(&mut self, addr: usize, value: u8) -> Result<()> {
        self.check_addr(addr)?;
        if self.data[addr] == value {
            return Ok(());
        }
        if let Some(budget) = self.write_budget {
            if self.physical_writes >= budget {
                return Err(RecordError::Medium(format!(
                    "Write to address {} interrupted",
                    addr
                )));
            }
        }
        self.data[addr] = value;
        self.physical_writes += 1;
        Ok(())
    }
}
