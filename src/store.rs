//! Record Store
//!
//! Key/value records over a fixed region of a storage medium.
//!
//! ## Responsibilities
//! - Validate or format the region header on `begin`
//! - Look up records by (key, size)
//! - Update existing records in place
//! - Append new records with crash-safe commit ordering
//!
//! Every call re-scans the chain from the start of the region; there is no
//! cache or index. A record, once created, is never moved, resized, or
//! reclaimed.

use std::ops::Range;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::{RecordError, Result};
use crate::medium::StorageMedium;
use crate::record::{self, RecordInfo, RecordIter, HEADER_SIZE};

/// The record store
///
/// ## Access Model
///
/// Single-threaded and synchronous: each operation runs a bounded linear
/// scan to completion. The store takes exclusive ownership of the region
/// once begun and does no internal locking; callers sharing a medium across
/// execution contexts must serialize access themselves.
pub struct RecordStore<M: StorageMedium> {
    /// Byte-level medium the region lives on
    medium: M,

    /// Field widths and default region
    config: Config,

    /// Region in use, set by a successful begin
    region: Option<Range<usize>>,
}

impl<M: StorageMedium> RecordStore<M> {
    /// Create a store over `medium`; nothing is read or written until `begin`
    pub fn new(medium: M, config: Config) -> Self {
        Self {
            medium,
            config,
            region: None,
        }
    }

    /// Begin using the configured region (or the whole medium)
    pub fn begin(&mut self) -> Result<()> {
        let range = self
            .config
            .region
            .clone()
            .unwrap_or(0..self.medium.len());
        self.begin_range(range)
    }

    /// Begin using `range` of the medium
    ///
    /// Formats the region if its header is missing. A region that already
    /// carries the header is used as-is.
    pub fn begin_range(&mut self, range: Range<usize>) -> Result<()> {
        let min_len = HEADER_SIZE + self.config.length_width.bytes();

        if range.end > self.medium.len() {
            return Err(RecordError::Config(format!(
                "Region end {} beyond medium of {} bytes",
                range.end,
                self.medium.len()
            )));
        }
        if range.end < range.start || range.end - range.start < min_len {
            return Err(RecordError::Config(format!(
                "Region {:?} too small: need at least {} bytes",
                range, min_len
            )));
        }

        if !record::has_header(&self.medium, range.start)? {
            info!(start = range.start, end = range.end, "formatting region");
            record::format_header(&mut self.medium, range.start, self.config.length_width)?;
        }

        self.region = Some(range);
        Ok(())
    }

    // =========================================================================
    // Typed Records
    // =========================================================================

    /// Read the record with `key` whose size matches `default`'s encoded size
    ///
    /// Returns `default` if no such record exists. Values are encoded with
    /// bincode's fixed-width little-endian format, so use fixed-size types
    /// (integers, arrays, structs of those).
    pub fn get_typed<T>(&self, key: u16, default: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let size = bincode::serialized_size(&default)? as usize;
        match self.find_record_address(key, size, None)? {
            Some(found) => {
                let bytes = self.medium.read_bytes(found.data_address, found.size)?;
                Ok(bincode::deserialize(&bytes)?)
            }
            None => Ok(default),
        }
    }

    /// Write a typed value under `key`
    pub fn set_typed<T: Serialize>(&mut self, key: u16, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)?;
        self.set_raw(key, &bytes)
    }

    /// Write a single-byte record
    pub fn set_byte(&mut self, key: u16, value: u8) -> Result<()> {
        self.set_raw(key, &[value])
    }

    // =========================================================================
    // Raw Records
    // =========================================================================

    /// Add or update the record with exact (`key`, `data.len()`)
    ///
    /// An existing record is overwritten in place; otherwise a new one is
    /// appended.
    ///
    /// An interrupted append leaves the chain as it was, provided the new
    /// record's total length is below 256 bytes. With a two-byte length field
    /// a longer record commits through two byte writes, and power loss
    /// between them leaves a record with a wrong length in the chain.
    pub fn set_raw(&mut self, key: u16, data: &[u8]) -> Result<()> {
        self.ensure_begun()?;
        self.check_key(key)?;

        if data.is_empty() {
            return Err(RecordError::InvalidArgument(
                "Record payload must not be empty".to_string(),
            ));
        }

        let max = self.config.max_payload();
        if data.len() > max {
            return Err(RecordError::PayloadTooLarge {
                size: data.len(),
                max,
            });
        }

        match self.find_record_address(key, data.len(), None)? {
            Some(found) => {
                trace!(key, address = found.data_address, size = found.size, "updating record in place");
                self.medium.update_bytes(found.data_address, data)
            }
            None => self.add_new_record(key, data),
        }
    }

    /// Payload of the first record with `key`, whatever its size
    pub fn read_raw(&self, key: u16) -> Result<Option<Vec<u8>>> {
        match self.find_record_address(key, 0, None)? {
            Some(found) => Ok(Some(self.medium.read_bytes(found.data_address, found.size)?)),
            None => Ok(None),
        }
    }

    /// Locate a record by key and size
    ///
    /// With `size == 0` any size matches and the record's actual size is in
    /// the result. Records whose data address is not greater than
    /// `resume_from` are skipped, so passing a previous result's
    /// `data_address` finds the next match.
    pub fn find_record_address(
        &self,
        key: u16,
        size: usize,
        resume_from: Option<usize>,
    ) -> Result<Option<RecordInfo>> {
        for record in self.records()? {
            let record = record?;
            if let Some(after) = resume_from {
                if record.data_address <= after {
                    continue;
                }
            }
            if record.key == key && (size == 0 || record.size == size) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Iterate the live records in address order
    pub fn records(&self) -> Result<RecordIter<'_, M>> {
        let region = self.region.as_ref().ok_or(RecordError::NotInitialized)?;
        Ok(RecordIter::new(
            &self.medium,
            self.config.key_width,
            self.config.length_width,
            region.start + HEADER_SIZE,
            region.end,
        ))
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Append a new record at the end of the live chain
    ///
    /// Does not look for an existing record with the same key. Write order:
    /// payload, key, new trailing sentinel, and finally the length field.
    /// Until the length lands, the old sentinel still ends the chain, so an
    /// interrupted append leaves the chain exactly as it was, as long as the
    /// length fits in one byte (see `set_raw`).
    pub(crate) fn add_new_record(&mut self, key: u16, data: &[u8]) -> Result<()> {
        self.ensure_begun()?;
        self.check_key(key)?;

        let end = self.region_end()?;
        let sentinel = self.records()?.end_of_chain()?;

        let key_width = self.config.key_width;
        let length_width = self.config.length_width;
        let record_len = self.config.record_header_len() + data.len();
        let needed = record_len + length_width.bytes();
        let available = end - sentinel;

        if needed > available {
            warn!(key, needed, available, "out of space");
            return Err(RecordError::OutOfSpace { needed, available });
        }

        let key_addr = sentinel + length_width.bytes();
        let data_addr = key_addr + key_width.bytes();

        self.medium.update_bytes(data_addr, data)?;
        record::write_field(&mut self.medium, key_addr, key_width, key as usize)?;
        record::write_field(&mut self.medium, data_addr + data.len(), length_width, 0)?;
        record::write_field(&mut self.medium, sentinel, length_width, record_len)?;

        debug!(key, address = sentinel, size = data.len(), "appended record");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether `begin` has succeeded
    pub fn is_begun(&self) -> bool {
        self.region.is_some()
    }

    /// Region in use, if begun
    pub fn region(&self) -> Option<Range<usize>> {
        self.region.clone()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bytes taken by the header, live chain, and sentinel
    pub fn used_bytes(&self) -> Result<usize> {
        let start = self.region.as_ref().ok_or(RecordError::NotInitialized)?.start;
        let sentinel = self.records()?.end_of_chain()?;
        Ok(sentinel + self.config.length_width.bytes() - start)
    }

    /// Bytes still available for new records (headers included)
    pub fn free_bytes(&self) -> Result<usize> {
        let end = self.region_end()?;
        let sentinel = self.records()?.end_of_chain()?;
        Ok(end - sentinel - self.config.length_width.bytes())
    }

    /// Borrow the underlying medium
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Release the underlying medium
    pub fn into_medium(self) -> M {
        self.medium
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    pub(crate) fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub(crate) fn ensure_begun(&self) -> Result<()> {
        if self.region.is_none() {
            return Err(RecordError::NotInitialized);
        }
        Ok(())
    }

    fn region_end(&self) -> Result<usize> {
        self.region
            .as_ref()
            .map(|r| r.end)
            .ok_or(RecordError::NotInitialized)
    }

    pub(crate) fn check_key(&self, key: u16) -> Result<()> {
        if key as usize > self.config.key_width.max_value() {
            return Err(RecordError::InvalidArgument(format!(
                "Key {} does not fit a {}-byte key field",
                key,
                self.config.key_width.bytes()
            )));
        }
        Ok(())
    }
}
