//! Process-wide registry of entity kinds.
//!
//! # Invariants
//! - A kind may be redefined freely until it is first used (`describe` or
//!   `lookup`). After that, redefinition is a configuration error.
//! - Kinds handed out are `Arc`-shared and never mutated.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::property::AttributeDescriptor;
use crate::value::AttributeValue;

#[derive(Debug)]
struct Entry {
    kind: Arc<EntityKind>,
    used: AtomicBool,
}

/// Registry of `{kind name → entity kind}`.
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    kinds: RwLock<HashMap<String, Entry>>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or, before first use, replace) an entity kind.
    pub fn define(&self, kind: EntityKind) -> ModelResult<Arc<EntityKind>> {
        let mut kinds = self
            .kinds
            .write()
            .map_err(|_| ModelError::configuration("property registry lock poisoned"))?;

        if let Some(existing) = kinds.get(kind.name()) {
            if existing.used.load(Ordering::Acquire) {
                return Err(ModelError::configuration(format!(
                    "entity kind `{}` redefined after first use",
                    kind.name()
                )));
            }
        }

        let name = kind.name().to_string();
        let kind = Arc::new(kind);
        debug!(kind = %name, properties = kind.properties().len(), "entity kind defined");
        kinds.insert(
            name,
            Entry {
                kind: Arc::clone(&kind),
                used: AtomicBool::new(false),
            },
        );
        Ok(kind)
    }

    /// The kind's schema. Marks the kind as used.
    pub fn describe(&self, kind: &str) -> ModelResult<Arc<EntityKind>> {
        let kinds = self
            .kinds
            .read()
            .map_err(|_| ModelError::configuration("property registry lock poisoned"))?;
        let entry = kinds
            .get(kind)
            .ok_or_else(|| ModelError::UnknownKind(kind.to_string()))?;
        entry.used.store(true, Ordering::Release);
        Ok(Arc::clone(&entry.kind))
    }

    /// Descriptor of `attribute` on `kind`. Marks the kind as used.
    pub fn lookup(&self, kind: &str, attribute: &str) -> ModelResult<AttributeDescriptor> {
        let kind = self.describe(kind)?;
        kind.lookup(attribute).cloned()
    }

    /// Validate a value for `kind.attribute` without touching any record.
    pub fn validate(
        &self,
        kind: &str,
        attribute: &str,
        value: AttributeValue,
    ) -> ModelResult<AttributeValue> {
        self.lookup(kind, attribute)?.validate(value)
    }

    /// Whether `kind` is defined. Does not mark it as used.
    pub fn is_defined(&self, kind: &str) -> ModelResult<bool> {
        let kinds = self
            .kinds
            .read()
            .map_err(|_| ModelError::configuration("property registry lock poisoned"))?;
        Ok(kinds.contains_key(kind))
    }
}
