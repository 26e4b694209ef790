//! Live-chain iterator
//!
//! Sequential walk over the records of a region, in address order, stopping
//! at the first zero-length sentinel.

use tracing::error;

use crate::config::FieldWidth;
use crate::error::{RecordError, Result};
use crate::medium::StorageMedium;

use super::codec::read_field;

/// Location and identity of one live record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    /// Address of the record's length field
    pub address: usize,
    /// Record key
    pub key: u16,
    /// Address of the first payload byte
    pub data_address: usize,
    /// Payload size in bytes
    pub size: usize,
}

impl RecordInfo {
    /// Total bytes the record occupies, headers included
    pub fn total_len(&self) -> usize {
        self.data_address - self.address + self.size
    }
}

/// Iterator over the live records of a region
///
/// Yields `Err(Corrupted)` once and then stops if the chain runs past the
/// region end or holds a length too small to cover its own header.
pub struct RecordIter<'a, M: StorageMedium> {
    medium: &'a M,
    key_width: FieldWidth,
    length_width: FieldWidth,
    /// Current position: a length field
    addr: usize,
    /// One past the last byte of the region
    end: usize,
    /// Address of the sentinel once reached
    sentinel: Option<usize>,
    done: bool,
}

impl<'a, M: StorageMedium> RecordIter<'a, M> {
    pub(crate) fn new(
        medium: &'a M,
        key_width: FieldWidth,
        length_width: FieldWidth,
        body_start: usize,
        end: usize,
    ) -> Self {
        Self {
            medium,
            key_width,
            length_width,
            addr: body_start,
            end,
            sentinel: None,
            done: false,
        }
    }

    /// Walk the remaining records and return the sentinel's address
    pub fn end_of_chain(mut self) -> Result<usize> {
        while let Some(record) = self.next() {
            record?;
        }
        self.sentinel
            .ok_or_else(|| RecordError::Corrupted("Record chain has no sentinel".to_string()))
    }

    fn corrupted(&mut self, msg: String) -> Option<Result<RecordInfo>> {
        self.done = true;
        error!(address = self.addr, "{}", msg);
        Some(Err(RecordError::Corrupted(msg)))
    }
}

impl<'a, M: StorageMedium> Iterator for RecordIter<'a, M> {
    type Item = Result<RecordInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let header_len = self.length_width.bytes() + self.key_width.bytes();

        if self.addr + self.length_width.bytes() > self.end {
            let msg = format!("Record chain overruns region end {} without a sentinel", self.end);
            return self.corrupted(msg);
        }

        let length = match read_field(self.medium, self.addr, self.length_width) {
            Ok(v) => v,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if length == 0 {
            self.sentinel = Some(self.addr);
            self.done = true;
            return None;
        }

        if length < header_len {
            let msg = format!("Record at {} has impossible length {}", self.addr, length);
            return self.corrupted(msg);
        }

        if self.addr + length > self.end {
            let msg = format!(
                "Record at {} with length {} runs past region end {}",
                self.addr, length, self.end
            );
            return self.corrupted(msg);
        }

        let key = match read_field(self.medium, self.addr + self.length_width.bytes(), self.key_width) {
            Ok(v) => v as u16,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let info = RecordInfo {
            address: self.addr,
            key,
            data_address: self.addr + header_len,
            size: length - header_len,
        };

        self.addr += length;
        Some(Ok(info))
    }
}
