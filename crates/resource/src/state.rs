//! Attribute state tracking.
//!
//! `AttributeState` keeps the current value of every attribute slot plus a
//! sparse ledger of baselines: a slot has a ledger entry iff it changed since
//! the last synchronization point. Dirtiness is membership in that ledger,
//! never a comparison against an implicit default.
//!
//! # Invariants
//! - The baseline of a slot is captured once per sync window, on its first
//!   change.
//! - Returning a slot to its baseline removes the ledger entry.
//! - Assigning the value a slot already holds never creates an entry.
//! - `sync` empties the ledger.

use std::collections::BTreeMap;

use recordkeep_core::AttributeValue;

/// Outcome of a single assignment, as seen by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same value as before; nothing recorded.
    Unchanged,
    /// First change since sync; baseline captured.
    Dirtied,
    /// Changed again while already dirty.
    StillDirty,
    /// Returned to the baseline; slot is clean again.
    Reverted,
}

/// Current values and change ledger of one record, indexed by descriptor
/// position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeState {
    current: Vec<AttributeValue>,
    original: BTreeMap<usize, AttributeValue>,
    persisted: bool,
}

impl AttributeState {
    /// State of a record that was never stored: every slot `Unset`, clean.
    pub fn new(slots: usize) -> Self {
        Self {
            current: vec![AttributeValue::Unset; slots],
            original: BTreeMap::new(),
            persisted: false,
        }
    }

    /// State of a record just read from a store: clean and persisted.
    pub fn loaded(current: Vec<AttributeValue>) -> Self {
        Self {
            current,
            original: BTreeMap::new(),
            persisted: true,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, slot: usize) -> &AttributeValue {
        &self.current[slot]
    }

    pub fn current(&self) -> &[AttributeValue] {
        &self.current
    }

    /// Assign an already validated value.
    pub fn set(&mut self, slot: usize, value: AttributeValue) -> Transition {
        let old = &self.current[slot];
        if *old == value {
            return Transition::Unchanged;
        }

        let transition = match self.original.get(&slot) {
            None => {
                self.original.insert(slot, old.clone());
                Transition::Dirtied
            }
            Some(baseline) if *baseline == value => {
                self.original.remove(&slot);
                Transition::Reverted
            }
            Some(_) => Transition::StillDirty,
        };

        self.current[slot] = value;
        transition
    }

    /// Overwrite a slot without touching the ledger.
    ///
    /// Used for values the store itself assigned (serial keys), immediately
    /// before `sync`.
    pub fn assign_stored(&mut self, slot: usize, value: AttributeValue) {
        self.current[slot] = value;
    }

    pub fn is_dirty(&self, slot: usize) -> bool {
        self.original.contains_key(&slot)
    }

    pub fn any_dirty(&self) -> bool {
        !self.original.is_empty()
    }

    /// Dirty slots with their current values.
    pub fn dirty(&self) -> impl Iterator<Item = (usize, &AttributeValue)> {
        self.original.keys().map(|&slot| (slot, &self.current[slot]))
    }

    /// Dirty slots with their baselines.
    pub fn original(&self) -> impl Iterator<Item = (usize, &AttributeValue)> {
        self.original.iter().map(|(&slot, v)| (slot, v))
    }

    /// Baseline of `slot` if dirty, otherwise its current value.
    pub fn synchronized(&self, slot: usize) -> &AttributeValue {
        self.original.get(&slot).unwrap_or(&self.current[slot])
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Synchronization point: forget all baselines, mark persisted.
    pub fn sync(&mut self) {
        self.original.clear();
        self.persisted = true;
    }
}
