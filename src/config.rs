//! Configuration for nvrecord
//!
//! Field widths decide the persisted byte layout, so they are fixed when a
//! `RecordStore` is constructed and never vary per call. Two stores with
//! different widths must never be pointed at the same region.

use std::ops::Range;

use crate::error::{RecordError, Result};

/// Width of an on-medium integer field (key or record length)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// One byte
    One,

    /// Two bytes, little-endian
    Two,
}

impl FieldWidth {
    /// Number of bytes the field occupies
    pub const fn bytes(self) -> usize {
        match self {
            FieldWidth::One => 1,
            FieldWidth::Two => 2,
        }
    }

    /// Largest value the field can hold
    pub const fn max_value(self) -> usize {
        match self {
            FieldWidth::One => u8::MAX as usize,
            FieldWidth::Two => u16::MAX as usize,
        }
    }

    /// Parse a width given as a byte count (1 or 2)
    pub fn from_bytes(n: usize) -> Result<Self> {
        match n {
            1 => Ok(FieldWidth::One),
            2 => Ok(FieldWidth::Two),
            other => Err(RecordError::Config(format!(
                "Field width must be 1 or 2 bytes, got {}",
                other
            ))),
        }
    }
}

/// Main configuration for a RecordStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Layout Configuration
    // -------------------------------------------------------------------------
    /// Width of the key field in every record
    pub key_width: FieldWidth,

    /// Width of the length field in every record (and of the sentinel)
    pub length_width: FieldWidth,

    // -------------------------------------------------------------------------
    // Region Configuration
    // -------------------------------------------------------------------------
    /// Half-open byte range used by `begin()`; `None` means the whole medium
    pub region: Option<Range<usize>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_width: FieldWidth::One,
            length_width: FieldWidth::One,
            region: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Largest payload a single record can carry with these widths
    ///
    /// The length field counts itself and the key, so the payload gets
    /// whatever is left of the field's maximum value.
    pub fn max_payload(&self) -> usize {
        self.length_width.max_value() - self.length_width.bytes() - self.key_width.bytes()
    }

    /// Bytes a record occupies in front of its payload
    pub fn record_header_len(&self) -> usize {
        self.length_width.bytes() + self.key_width.bytes()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the key field width
    pub fn key_width(mut self, width: FieldWidth) -> Self {
        self.config.key_width = width;
        self
    }

    /// Set the length field width
    pub fn length_width(mut self, width: FieldWidth) -> Self {
        self.config.length_width = width;
        self
    }

    /// Restrict the store to `start..end` of the medium
    pub fn region(mut self, start: usize, end: usize) -> Self {
        self.config.region = Some(start..end);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
