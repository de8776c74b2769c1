//! Repository configuration.
//!
//! Which repositories exist and which adapter backs each one. The `default`
//! repository is always present, whether configured or not.

use std::collections::HashSet;

use recordkeep_core::{ModelError, ModelResult, RepositoryName};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable listing extra repositories, comma-separated.
pub const REPOSITORIES_ENV: &str = "RECORDKEEP_REPOSITORIES";

/// Backend behind a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    #[default]
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySettings {
    pub name: RepositoryName,
    #[serde(default)]
    pub adapter: AdapterKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    repositories: Vec<RepositorySettings>,
}

impl RepositoryConfig {
    /// Parse a JSON document such as
    /// `{"repositories": [{"name": "alternate", "adapter": "in_memory"}]}`.
    pub fn from_json(raw: &str) -> ModelResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| ModelError::configuration(format!("invalid repository config: {e}")))?;
        config.with_default()
    }

    /// Read [`REPOSITORIES_ENV`]; only `default` when it is unset.
    pub fn from_env() -> ModelResult<Self> {
        match std::env::var(REPOSITORIES_ENV) {
            Ok(raw) => Self::parse_list(&raw),
            Err(_) => {
                debug!("{REPOSITORIES_ENV} not set; using the default repository only");
                Self::default().with_default()
            }
        }
    }

    /// Comma-separated names, all in-memory. Blank segments are ignored.
    pub fn parse_list(raw: &str) -> ModelResult<Self> {
        let names = raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<RepositoryName>)
            .collect::<ModelResult<Vec<_>>>()?;
        Self::from_names(names)
    }

    pub fn from_names<I>(names: I) -> ModelResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<RepositoryName>,
    {
        let repositories = names
            .into_iter()
            .map(|name| RepositorySettings {
                name: name.into(),
                adapter: AdapterKind::InMemory,
            })
            .collect();
        Self { repositories }.with_default()
    }

    pub fn repositories(&self) -> &[RepositorySettings] {
        &self.repositories
    }

    /// Reject duplicate names.
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen = HashSet::new();
        for settings in &self.repositories {
            if !seen.insert(&settings.name) {
                return Err(ModelError::configuration(format!(
                    "repository `{}` configured twice",
                    settings.name
                )));
            }
        }
        Ok(())
    }

    fn with_default(mut self) -> ModelResult<Self> {
        if !self.repositories.iter().any(|r| r.name.is_default()) {
            self.repositories.insert(
                0,
                RepositorySettings {
                    name: RepositoryName::default_name(),
                    adapter: AdapterKind::InMemory,
                },
            );
        }
        self.validate()?;
        Ok(self)
    }
}
