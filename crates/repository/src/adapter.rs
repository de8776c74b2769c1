//! Storage adapter boundary.
//!
//! The state tracker never talks to a backend directly. Everything it needs
//! from storage goes through [`Adapter`], and `sync` runs only after an adapter
//! call succeeded.

use std::sync::Arc;

use recordkeep_core::{AdapterError, AttributeMap, EntityKind, RecordKey};

/// Load/persist boundary implemented by storage backends.
pub trait Adapter: Send + Sync {
    /// Load the stored attribute values of `key`, or `None` if absent.
    fn load(&self, kind: &EntityKind, key: &RecordKey) -> Result<Option<AttributeMap>, AdapterError>;

    /// Persist `values` for a record.
    ///
    /// - `key == None` creates a new row from the full set of assigned values.
    ///   Serial key attributes missing from `values` are assigned here.
    /// - `key == Some(k)` updates the row stored under `k` with the changed
    ///   values only.
    ///
    /// Returns the key the row is stored under afterwards.
    fn persist(
        &self,
        kind: &EntityKind,
        key: Option<&RecordKey>,
        values: &AttributeMap,
    ) -> Result<RecordKey, AdapterError>;
}

impl<S> Adapter for Arc<S>
where
    S: Adapter + ?Sized,
{
    fn load(&self, kind: &EntityKind, key: &RecordKey) -> Result<Option<AttributeMap>, AdapterError> {
        (**self).load(kind, key)
    }

    fn persist(
        &self,
        kind: &EntityKind,
        key: Option<&RecordKey>,
        values: &AttributeMap,
    ) -> Result<RecordKey, AdapterError> {
        (**self).persist(kind, key, values)
    }
}
