//! Entity kinds: the schema shared by every record of one logical class.

use std::collections::HashSet;

use crate::error::{ModelError, ModelResult};
use crate::id::{RecordKey, RepositoryName};
use crate::property::{AttributeDescriptor, Primitive};
use crate::value::AttributeValue;

/// Named, ordered set of attribute descriptors.
///
/// Built once through [`EntityKind::builder`] and shared read-only (behind an
/// `Arc`) by every record of the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKind {
    name: String,
    properties: Vec<AttributeDescriptor>,
    default_repository: RepositoryName,
}

impl EntityKind {
    pub fn builder(name: impl Into<String>) -> EntityKindBuilder {
        EntityKindBuilder {
            name: name.into(),
            properties: Vec::new(),
            default_repository: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptors in declaration order.
    pub fn properties(&self) -> &[AttributeDescriptor] {
        &self.properties
    }

    /// Repository used when no scope is active.
    pub fn default_repository_name(&self) -> &RepositoryName {
        &self.default_repository
    }

    pub fn lookup(&self, attribute: &str) -> ModelResult<&AttributeDescriptor> {
        self.position(attribute).map(|idx| &self.properties[idx])
    }

    /// Declaration index of `attribute`.
    pub fn position(&self, attribute: &str) -> ModelResult<usize> {
        self.properties
            .iter()
            .position(|p| p.name() == attribute)
            .ok_or_else(|| ModelError::unknown_attribute(&self.name, attribute))
    }

    /// Key attributes with their declaration indexes.
    pub fn key_properties(&self) -> impl Iterator<Item = (usize, &AttributeDescriptor)> {
        self.properties.iter().enumerate().filter(|(_, p)| p.is_key())
    }

    /// Coerce a caller-supplied key through the key descriptors, so it
    /// matches the key rows are stored under.
    pub fn typed_key(&self, key: RecordKey) -> ModelResult<RecordKey> {
        let expected = self.key_properties().count();
        if key.len() != expected {
            let names: Vec<_> = self.key_properties().map(|(_, p)| p.name()).collect();
            return Err(ModelError::invalid_value(
                names.join(","),
                format!("{} key has {expected} part(s), got {}", self.name, key.len()),
            ));
        }

        self.key_properties()
            .zip(key.values().iter().cloned())
            .map(|((_, p), value)| {
                p.validate(AttributeValue::Value(value))?
                    .into_value()
                    .ok_or_else(|| ModelError::invalid_value(p.name(), "key must have a value"))
            })
            .collect::<ModelResult<Vec<_>>>()
            .map(RecordKey::new)
    }
}

/// Builder for [`EntityKind`]; `build` enforces the schema invariants.
#[derive(Debug, Clone)]
pub struct EntityKindBuilder {
    name: String,
    properties: Vec<AttributeDescriptor>,
    default_repository: Option<RepositoryName>,
}

impl EntityKindBuilder {
    pub fn property(mut self, descriptor: AttributeDescriptor) -> Self {
        self.properties.push(descriptor);
        self
    }

    /// Bind the kind to a repository other than `default` when no scope is active.
    pub fn default_repository(mut self, name: impl Into<RepositoryName>) -> Self {
        self.default_repository = Some(name.into());
        self
    }

    pub fn build(self) -> ModelResult<EntityKind> {
        if self.name.trim().is_empty() {
            return Err(ModelError::configuration("entity kind name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for p in &self.properties {
            if p.name().trim().is_empty() {
                return Err(ModelError::configuration(format!(
                    "{}: attribute name cannot be empty",
                    self.name
                )));
            }
            if !seen.insert(p.name()) {
                return Err(ModelError::configuration(format!(
                    "{}: attribute `{}` is declared twice",
                    self.name,
                    p.name()
                )));
            }
            if p.is_serial() && p.primitive() != Primitive::Integer {
                return Err(ModelError::configuration(format!(
                    "{}: serial attribute `{}` must be an integer",
                    self.name,
                    p.name()
                )));
            }
            if let Some(default) = p.default() {
                p.primitive().coerce(default.clone()).map_err(|reason| {
                    ModelError::configuration(format!(
                        "{}: default for `{}` is invalid: {reason}",
                        self.name,
                        p.name()
                    ))
                })?;
            }
        }

        if !self.properties.iter().any(AttributeDescriptor::is_key) {
            return Err(ModelError::configuration(format!(
                "{}: at least one key attribute is required",
                self.name
            )));
        }

        Ok(EntityKind {
            name: self.name,
            properties: self.properties,
            default_repository: self.default_repository.unwrap_or_default(),
        })
    }
}
