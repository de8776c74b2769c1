//! Strongly-typed names and keys used across the model layer.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::value::Value;

/// Name of the repository every process starts with.
pub const DEFAULT_REPOSITORY: &str = "default";

/// Name of a backing data store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Create a repository name. Empty names are rejected by `FromStr`; this
    /// constructor is for names known at compile time.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The `default` repository.
    pub fn default_name() -> Self {
        Self(DEFAULT_REPOSITORY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_REPOSITORY
    }
}

impl Default for RepositoryName {
    fn default() -> Self {
        Self::default_name()
    }
}

impl core::fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepositoryName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RepositoryName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for RepositoryName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ModelError::configuration("repository name cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Identity of a record: the values of its key attributes, in descriptor order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(Vec<Value>);

impl RecordKey {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            core::fmt::Display::fmt(value, f)?;
        }
        Ok(())
    }
}

macro_rules! impl_single_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for RecordKey {
                fn from(value: $t) -> Self {
                    Self(vec![Value::from(value)])
                }
            }
        )*
    };
}

impl_single_key!(Value, i64, &str, String, uuid::Uuid);

impl From<Vec<Value>> for RecordKey {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}
