//! Records: instances of an entity kind with change tracking.
//!
//! # Invariants
//! - Every assignment is validated before any state changes; a rejected value
//!   leaves the record exactly as it was.
//! - `sync` only runs after the adapter reported success, so a failed save
//!   keeps the dirty attributes.
//! - A record that was stored or loaded stays bound to that repository; an
//!   unsaved record resolves its repository at call time.

use std::sync::Arc;

use recordkeep_core::{
    AdapterError, AttributeMap, AttributeValue, EntityKind, ModelError, ModelResult, RecordKey,
    RepositoryName,
};
use recordkeep_repository::{Repository, RepositoryRegistry, context};
use tracing::{debug, warn};

use crate::state::{AttributeState, Transition};

#[derive(Debug, Clone)]
pub struct Record {
    kind: Arc<EntityKind>,
    repositories: Arc<RepositoryRegistry>,
    bound: Option<RepositoryName>,
    state: AttributeState,
}

impl Record {
    pub(crate) fn new(kind: Arc<EntityKind>, repositories: Arc<RepositoryRegistry>) -> Self {
        let state = AttributeState::new(kind.properties().len());
        Self {
            kind,
            repositories,
            bound: None,
            state,
        }
    }

    /// Rebuild a clean, persisted record from a stored row.
    pub(crate) fn load(
        kind: Arc<EntityKind>,
        repositories: Arc<RepositoryRegistry>,
        repository: RepositoryName,
        row: AttributeMap,
    ) -> ModelResult<Self> {
        let mut current = vec![AttributeValue::Unset; kind.properties().len()];
        for (name, value) in row {
            let slot = kind.position(&name)?;
            current[slot] = match value {
                AttributeValue::Unset => AttributeValue::Unset,
                other => kind.properties()[slot].validate(other)?,
            };
        }

        Ok(Self {
            kind,
            repositories,
            bound: Some(repository),
            state: AttributeState::loaded(current),
        })
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn attribute(&self, name: &str) -> ModelResult<&AttributeValue> {
        let slot = self.kind.position(name)?;
        Ok(self.state.get(slot))
    }

    /// Validate and assign an attribute, updating the change ledger.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttributeValue>) -> ModelResult<()> {
        let slot = self.kind.position(name)?;
        let value = self.kind.properties()[slot].validate(value.into())?;

        match self.state.set(slot, value) {
            Transition::Dirtied => {
                debug!(kind = %self.kind.name(), attribute = name, "attribute dirtied")
            }
            Transition::Reverted => {
                debug!(kind = %self.kind.name(), attribute = name, "attribute reverted to synchronized value")
            }
            Transition::Unchanged | Transition::StillDirty => {}
        }
        Ok(())
    }

    /// Whether `name` changed since the last synchronization point.
    pub fn attribute_dirty(&self, name: &str) -> ModelResult<bool> {
        let slot = self.kind.position(name)?;
        Ok(self.state.is_dirty(slot))
    }

    /// Changed attributes with their current values.
    pub fn dirty_attributes(&self) -> AttributeMap {
        self.named(self.state.dirty())
    }

    /// Changed attributes with their values at the last synchronization point.
    pub fn original_attributes(&self) -> AttributeMap {
        self.named(self.state.original())
    }

    pub fn is_dirty(&self) -> bool {
        self.state.any_dirty()
    }

    pub fn is_new(&self) -> bool {
        !self.state.is_persisted()
    }

    pub fn is_persisted(&self) -> bool {
        self.state.is_persisted()
    }

    /// Current key values, or `None` while any key attribute has no value.
    pub fn key(&self) -> Option<RecordKey> {
        self.key_from(move |slot| self.state.get(slot))
    }

    /// Name of the repository this record belongs to.
    pub fn repository_name(&self) -> RepositoryName {
        match &self.bound {
            Some(name) => name.clone(),
            None => context::resolve(self.kind.default_repository_name()),
        }
    }

    pub fn repository(&self) -> ModelResult<Repository> {
        self.repositories.repository(&self.repository_name())
    }

    /// Persist pending changes through the record's repository.
    ///
    /// A clean persisted record is left alone.
    pub fn save(&mut self) -> ModelResult<()> {
        let repository = self.repository()?;
        self.save_to(&repository)
    }

    pub(crate) fn save_to(&mut self, repository: &Repository) -> ModelResult<()> {
        if self.state.is_persisted() {
            self.update(repository)
        } else {
            self.insert(repository)
        }
    }

    fn insert(&mut self, repository: &Repository) -> ModelResult<()> {
        let mut values = AttributeMap::new();
        let mut defaults = Vec::new();

        for (slot, p) in self.kind.properties().iter().enumerate() {
            match (self.state.get(slot), p.default()) {
                (AttributeValue::Unset, Some(default)) => {
                    let value = p.validate(default.clone().into())?;
                    values.insert(p.name().to_string(), value.clone());
                    defaults.push((slot, value));
                }
                (AttributeValue::Unset, None) if p.is_required() && !p.is_serial() => {
                    return Err(ModelError::invalid_value(p.name(), "value is required"));
                }
                (AttributeValue::Unset, None) => {}
                (value, _) => {
                    values.insert(p.name().to_string(), value.clone());
                }
            }
        }

        let key = repository
            .adapter()
            .persist(&self.kind, None, &values)
            .map_err(|e| self.persist_failed(repository, e))?;

        for (slot, value) in defaults {
            self.state.assign_stored(slot, value);
        }
        let stored: Vec<usize> = self.kind.key_properties().map(|(slot, _)| slot).collect();
        for (slot, value) in stored.into_iter().zip(key.values().iter().cloned()) {
            if self.state.get(slot).is_unset() {
                self.state.assign_stored(slot, AttributeValue::Value(value));
            }
        }

        self.state.sync();
        self.bound = Some(repository.name().clone());
        debug!(kind = %self.kind.name(), repository = %repository, key = %key, "record created");
        Ok(())
    }

    fn update(&mut self, repository: &Repository) -> ModelResult<()> {
        if !self.state.any_dirty() {
            return Ok(());
        }

        let key = self.stored_key().ok_or_else(|| {
            ModelError::Adapter(AdapterError::MissingKey(format!(
                "{} record has no stored key",
                self.kind.name()
            )))
        })?;
        let values = self.dirty_attributes();

        let new_key = repository
            .adapter()
            .persist(&self.kind, Some(&key), &values)
            .map_err(|e| self.persist_failed(repository, e))?;

        self.state.sync();
        debug!(kind = %self.kind.name(), repository = %repository, key = %new_key, "record updated");
        Ok(())
    }

    fn persist_failed(&self, repository: &Repository, error: AdapterError) -> ModelError {
        warn!(
            kind = %self.kind.name(),
            repository = %repository,
            error = %error,
            "persist failed; dirty attributes retained"
        );
        ModelError::Adapter(error)
    }

    /// Key the row is stored under: baselines win over pending key changes.
    fn stored_key(&self) -> Option<RecordKey> {
        self.key_from(move |slot| self.state.synchronized(slot))
    }

    fn key_from<'a>(&'a self, value_of: impl Fn(usize) -> &'a AttributeValue) -> Option<RecordKey> {
        self.kind
            .key_properties()
            .map(|(slot, _)| value_of(slot).as_value().cloned())
            .collect::<Option<Vec<_>>>()
            .map(RecordKey::new)
    }

    fn named<'a>(&self, entries: impl Iterator<Item = (usize, &'a AttributeValue)>) -> AttributeMap {
        let properties = self.kind.properties();
        entries
            .map(|(slot, value)| (properties[slot].name().to_string(), value.clone()))
            .collect()
    }
}
