//! Error types for nvrecord
//!
//! Provides a unified error type for all operations.
//!
//! "Not found" is not an error here: lookups return `Ok(None)`, typed reads
//! fall back to the caller's default, and list queries return `Ok(false)`.

use thiserror::Error;

/// Result type alias using RecordError
pub type Result<T> = std::result::Result<T, RecordError>;

/// Unified error type for nvrecord operations
#[derive(Debug, Error)]
pub enum RecordError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Record store not initialized: call begin() first")]
    NotInitialized,

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Region Errors
    // -------------------------------------------------------------------------
    #[error("Out of space: need {needed} bytes, {available} available")]
    OutOfSpace { needed: usize, available: usize },

    #[error("Region corrupted: {0}")]
    Corrupted(String),

    // -------------------------------------------------------------------------
    // Medium Errors
    // -------------------------------------------------------------------------
    #[error("Storage medium error: {0}")]
    Medium(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for RecordError {
    fn from(e: bincode::Error) -> Self {
        RecordError::Serialization(e.to_string())
    }
}
