//! List Entries
//!
//! Multi-valued lists of 32-bit ids stored in ordinary records.
//!
//! ## Slot Groups
//! ```text
//! ┌────────┬──────────┬──────────────┬──────────────┬──────────────┐
//! │ Length │ ListKey  │ Slot 0 (4)   │ Slot 1 (4)   │ Slot 2 (4)   │
//! └────────┴──────────┴──────────────┴──────────────┴──────────────┘
//! ```
//!
//! Any number of records may share a list key; together they form one
//! unordered list. A slot holding `0xFFFFFFFF` is empty and can be reused by
//! a later add to the same list. Slots are little-endian. When no record of
//! the list has an empty slot, an add appends a new 12-byte group.
//!
//! Masked comparisons treat the tombstone like any other value: under a
//! narrow mask an empty slot can match an id whose masked bits are all ones.
//! `list_delete` with such a mask rewrites the tombstone with itself, which
//! is a no-op on the medium but still reports a match.

use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::error::{RecordError, Result};
use crate::medium::StorageMedium;
use crate::record::{SLOTS_PER_GROUP, SLOT_SIZE, TOMBSTONE};
use crate::store::RecordStore;

/// Comparison mask that matches on every bit
pub const FULL_MASK: u32 = u32::MAX;

impl<M: StorageMedium> RecordStore<M> {
    /// Whether any slot of list `listkey` matches `id` under `mask`
    pub fn list_query(&self, id: u32, listkey: u16, mask: u32) -> Result<bool> {
        let mut found = false;
        self.scan_slots(listkey, |_, value| {
            if value & mask == id & mask {
                found = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })?;
        Ok(found)
    }

    /// Add `id` to list `listkey` unless it is already there
    ///
    /// Reuses the first empty slot found in address order; allocates a new
    /// slot group only when the list has none.
    pub fn list_add(&mut self, id: u32, listkey: u16) -> Result<()> {
        if id == TOMBSTONE {
            return Err(RecordError::InvalidArgument(format!(
                "Id 0x{:08X} is reserved for empty slots",
                TOMBSTONE
            )));
        }

        let mut present = false;
        let mut free_slot = None;
        self.scan_slots(listkey, |addr, value| {
            if value == id {
                present = true;
                return ControlFlow::Break(());
            }
            if value == TOMBSTONE && free_slot.is_none() {
                free_slot = Some(addr);
            }
            ControlFlow::Continue(())
        })?;

        if present {
            return Ok(());
        }

        match free_slot {
            Some(addr) => {
                trace!(listkey, id, address = addr, "reusing empty slot");
                self.medium_mut().update_bytes(addr, &id.to_le_bytes())
            }
            None => {
                let mut group = [0xFFu8; SLOT_SIZE * SLOTS_PER_GROUP];
                group[..SLOT_SIZE].copy_from_slice(&id.to_le_bytes());
                debug!(listkey, id, "allocating slot group");
                self.add_new_record(listkey, &group)
            }
        }
    }

    /// Empty every slot of list `listkey` matching `id` under `mask`
    ///
    /// Returns whether any slot matched.
    pub fn list_delete(&mut self, id: u32, listkey: u16, mask: u32) -> Result<bool> {
        let mut matches = Vec::new();
        self.scan_slots(listkey, |addr, value| {
            if value & mask == id & mask {
                matches.push(addr);
            }
            ControlFlow::Continue(())
        })?;

        let tombstone = TOMBSTONE.to_le_bytes();
        for &addr in &matches {
            trace!(listkey, address = addr, "clearing slot");
            self.medium_mut().update_bytes(addr, &tombstone)?;
        }
        Ok(!matches.is_empty())
    }

    /// Visit every id of list `listkey` in address order
    ///
    /// The visitor holds no access to the store, so it cannot mutate the
    /// list mid-traversal.
    pub fn list_enumerate<F>(&self, listkey: u16, mut visitor: F) -> Result<()>
    where
        F: FnMut(u32),
    {
        self.scan_slots(listkey, |_, value| {
            if value != TOMBSTONE {
                visitor(value);
            }
            ControlFlow::Continue(())
        })
    }

    /// Collect the ids of list `listkey` in address order
    pub fn list_entries(&self, listkey: u16) -> Result<Vec<u32>> {
        let mut ids = Vec::new();
        self.list_enumerate(listkey, |id| ids.push(id))?;
        Ok(ids)
    }

    /// Walk every whole slot of every record keyed `listkey`
    ///
    /// `f` gets the slot address and value; trailing bytes shorter than a
    /// slot are ignored. A list key wider than the key field is rejected.
    fn scan_slots<F>(&self, listkey: u16, mut f: F) -> Result<()>
    where
        F: FnMut(usize, u32) -> ControlFlow<()>,
    {
        self.ensure_begun()?;
        self.check_key(listkey)?;

        for record in self.records()? {
            let record = record?;
            if record.key != listkey {
                continue;
            }

            for slot in 0..record.size / SLOT_SIZE {
                let addr = record.data_address + slot * SLOT_SIZE;
                let bytes = self.medium().read_bytes(addr, SLOT_SIZE)?;
                let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                if f(addr, value).is_break() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}
