use std::collections::HashMap;
use std::sync::RwLock;

use recordkeep_core::{AdapterError, AttributeMap, AttributeValue, EntityKind, RecordKey, Value};

use crate::adapter::Adapter;

#[derive(Debug, Default)]
struct Table {
    rows: HashMap<RecordKey, AttributeMap>,
    last_serial: i64,
}

/// In-memory adapter, one table per entity kind.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryAdapter {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows stored for `kind`.
    pub fn len(&self, kind: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(kind).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, kind: &str) -> bool {
        self.len(kind) == 0
    }

    fn key_of(kind: &EntityKind, row: &AttributeMap) -> Result<RecordKey, AdapterError> {
        let mut values = Vec::new();
        for (_, p) in kind.key_properties() {
            match row.get(p.name()) {
                Some(AttributeValue::Value(v)) => values.push(v.clone()),
                _ => {
                    return Err(AdapterError::MissingKey(format!(
                        "{}.{} is not set",
                        kind.name(),
                        p.name()
                    )));
                }
            }
        }
        Ok(RecordKey::new(values))
    }

    fn create(table: &mut Table, kind: &EntityKind, values: &AttributeMap) -> Result<RecordKey, AdapterError> {
        let mut row: AttributeMap = values
            .iter()
            .filter(|(_, v)| !v.is_unset())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (_, p) in kind.key_properties().filter(|(_, p)| p.is_serial()) {
            match row.get(p.name()).and_then(AttributeValue::as_value) {
                Some(Value::Integer(explicit)) => {
                    table.last_serial = table.last_serial.max(*explicit);
                }
                _ => {
                    table.last_serial = table.last_serial.checked_add(1).ok_or_else(|| {
                        AdapterError::backend(format!("{}.{}: serial key space exhausted", kind.name(), p.name()))
                    })?;
                    row.insert(
                        p.name().to_string(),
                        AttributeValue::Value(Value::Integer(table.last_serial)),
                    );
                }
            }
        }

        let key = Self::key_of(kind, &row)?;
        if table.rows.contains_key(&key) {
            return Err(AdapterError::Conflict(format!("{}/{key} already exists", kind.name())));
        }
        table.rows.insert(key.clone(), row);
        Ok(key)
    }

    fn update(
        table: &mut Table,
        kind: &EntityKind,
        key: &RecordKey,
        values: &AttributeMap,
    ) -> Result<RecordKey, AdapterError> {
        let mut row = table
            .rows
            .get(key)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(format!("{}/{key}", kind.name())))?;

        for (name, value) in values {
            row.insert(name.clone(), value.clone());
        }

        let new_key = Self::key_of(kind, &row)?;
        if &new_key != key && table.rows.contains_key(&new_key) {
            return Err(AdapterError::Conflict(format!("{}/{new_key} already exists", kind.name())));
        }
        table.rows.remove(key);
        table.rows.insert(new_key.clone(), row);
        Ok(new_key)
    }
}

impl Adapter for InMemoryAdapter {
    fn load(&self, kind: &EntityKind, key: &RecordKey) -> Result<Option<AttributeMap>, AdapterError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| AdapterError::backend("lock poisoned"))?;

        Ok(tables.get(kind.name()).and_then(|t| t.rows.get(key)).cloned())
    }

    fn persist(
        &self,
        kind: &EntityKind,
        key: Option<&RecordKey>,
        values: &AttributeMap,
    ) -> Result<RecordKey, AdapterError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| AdapterError::backend("lock poisoned"))?;

        let table = tables.entry(kind.name().to_string()).or_default();
        match key {
            None => Self::create(table, kind, values),
            Some(key) => Self::update(table, kind, key, values),
        }
    }
}
