//! Model: entity kind + repositories, the entry point for record lifecycle
//! operations.

use std::sync::Arc;

use recordkeep_core::{
    AttributeValue, EntityKind, ModelResult, PropertyRegistry, RecordKey, RepositoryName,
};
use recordkeep_repository::{Repository, RepositoryRegistry};
use tracing::debug;

use crate::record::Record;

/// Lifecycle operations for records of one entity kind.
///
/// Operations without an explicit repository resolve one through the
/// repository context: the innermost entered scope, or the kind's
/// `default_repository_name()` when no scope is active.
#[derive(Debug, Clone)]
pub struct Model {
    kind: Arc<EntityKind>,
    repositories: Arc<RepositoryRegistry>,
}

impl Model {
    pub fn new(kind: Arc<EntityKind>, repositories: Arc<RepositoryRegistry>) -> Self {
        Self { kind, repositories }
    }

    /// Model for a kind defined in `properties`. Marks the kind as used.
    pub fn from_registry(
        properties: &PropertyRegistry,
        kind: &str,
        repositories: Arc<RepositoryRegistry>,
    ) -> ModelResult<Self> {
        Ok(Self::new(properties.describe(kind)?, repositories))
    }

    pub fn kind(&self) -> &Arc<EntityKind> {
        &self.kind
    }

    pub fn default_repository_name(&self) -> &RepositoryName {
        self.kind.default_repository_name()
    }

    /// Repository the next operation without an explicit repository targets.
    pub fn repository(&self) -> ModelResult<Repository> {
        self.repositories.resolve(&self.kind)
    }

    /// Unsaved record with every attribute unset.
    pub fn new_record(&self) -> Record {
        Record::new(Arc::clone(&self.kind), Arc::clone(&self.repositories))
    }

    /// Unsaved record with `overrides` assigned.
    ///
    /// Each override goes through `set_attribute` against an unset baseline,
    /// so every supplied attribute is dirty, even one supplied as `Null`.
    pub fn new_with<I, K, V>(&self, overrides: I) -> ModelResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttributeValue>,
    {
        let mut record = self.new_record();
        for (name, value) in overrides {
            record.set_attribute(name.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Build and save a record in the resolved repository.
    pub fn create<I, K, V>(&self, overrides: I) -> ModelResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttributeValue>,
    {
        let repository = self.repository()?;
        self.create_into(&repository, overrides)
    }

    /// Build and save a record in `repository`, ignoring the context.
    pub fn create_in<I, K, V>(&self, repository: &RepositoryName, overrides: I) -> ModelResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttributeValue>,
    {
        let repository = self.repositories.repository(repository)?;
        self.create_into(&repository, overrides)
    }

    /// Load a record by key from the resolved repository.
    pub fn get(&self, key: impl Into<RecordKey>) -> ModelResult<Option<Record>> {
        let repository = self.repository()?;
        self.get_from(&repository, key.into())
    }

    /// Load a record by key from `repository`, ignoring the context.
    pub fn get_in(
        &self,
        repository: &RepositoryName,
        key: impl Into<RecordKey>,
    ) -> ModelResult<Option<Record>> {
        let repository = self.repositories.repository(repository)?;
        self.get_from(&repository, key.into())
    }

    fn create_into<I, K, V>(&self, repository: &Repository, overrides: I) -> ModelResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttributeValue>,
    {
        let mut record = self.new_with(overrides)?;
        record.save_to(repository)?;
        Ok(record)
    }

    fn get_from(&self, repository: &Repository, key: RecordKey) -> ModelResult<Option<Record>> {
        let key = self.kind.typed_key(key)?;
        let Some(row) = repository.adapter().load(&self.kind, &key)? else {
            debug!(kind = %self.kind.name(), repository = %repository, key = %key, "record not found");
            return Ok(None);
        };

        Record::load(
            Arc::clone(&self.kind),
            Arc::clone(&self.repositories),
            repository.name().clone(),
            row,
        )
        .map(Some)
    }
}
