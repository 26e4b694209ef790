//! # nvrecord
//!
//! A micro storage engine for byte-rewritable non-volatile memory (EEPROM):
//! - Key/value records with variable-length payloads
//! - Lists of 32-bit ids keyed by the same key space
//! - Append-only allocation with crash-safe commit ordering
//! - Wear reduction: unchanged bytes are never rewritten
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     List operations                          │
//! │          (query / add / delete / enumerate)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  slot-level access to matching records
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      RecordStore                             │
//! │    header · lookup · in-place update · append allocation     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  read_byte / write_if_different
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    StorageMedium                             │
//! │            (EEPROM, image file, RAM for tests)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use nvrecord::{Config, InMemoryMedium, RecordStore, FULL_MASK};
//!
//! let mut store = RecordStore::new(InMemoryMedium::new(64), Config::default());
//! store.begin().unwrap();
//!
//! store.set_typed(1, &42u16).unwrap();
//! assert_eq!(store.get_typed(1, 0u16).unwrap(), 42);
//!
//! store.list_add(7, 9).unwrap();
//! assert!(store.list_query(7, 9, FULL_MASK).unwrap());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod medium;
pub mod record;
pub mod store;
pub mod list;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RecordError, Result};
pub use config::{Config, FieldWidth};
pub use medium::{FileMedium, InMemoryMedium, StorageMedium};
pub use record::{RecordInfo, TOMBSTONE};
pub use store::RecordStore;
pub use list::FULL_MASK;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nvrecord
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
