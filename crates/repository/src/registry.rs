//! Registered repositories: `{repository name → adapter}`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use recordkeep_core::{EntityKind, ModelError, ModelResult, RepositoryName};
use tracing::info;

use crate::adapter::Adapter;
use crate::config::{AdapterKind, RepositoryConfig};
use crate::context;
use crate::in_memory::InMemoryAdapter;
use crate::repository::Repository;

#[derive(Default)]
pub struct RepositoryRegistry {
    adapters: RwLock<HashMap<RepositoryName, Arc<dyn Adapter>>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with one adapter per configured repository.
    pub fn from_config(config: &RepositoryConfig) -> ModelResult<Self> {
        config.validate()?;
        let registry = Self::new();
        for settings in config.repositories() {
            let adapter: Arc<dyn Adapter> = match settings.adapter {
                AdapterKind::InMemory => Arc::new(InMemoryAdapter::new()),
            };
            registry.setup_shared(settings.name.clone(), adapter)?;
        }
        Ok(registry)
    }

    /// Register (or replace) the adapter backing `name`.
    pub fn setup(&self, name: impl Into<RepositoryName>, adapter: impl Adapter + 'static) -> ModelResult<Repository> {
        self.setup_shared(name.into(), Arc::new(adapter))
    }

    pub fn setup_shared(&self, name: RepositoryName, adapter: Arc<dyn Adapter>) -> ModelResult<Repository> {
        let mut adapters = self
            .adapters
            .write()
            .map_err(|_| ModelError::configuration("repository registry lock poisoned"))?;
        adapters.insert(name.clone(), Arc::clone(&adapter));
        info!(repository = %name, "repository registered");
        Ok(Repository::new(name, adapter))
    }

    /// Handle for `name`, or `UnknownRepository`.
    pub fn repository(&self, name: &RepositoryName) -> ModelResult<Repository> {
        let adapters = self
            .adapters
            .read()
            .map_err(|_| ModelError::configuration("repository registry lock poisoned"))?;
        adapters
            .get(name)
            .map(|adapter| Repository::new(name.clone(), Arc::clone(adapter)))
            .ok_or_else(|| ModelError::UnknownRepository(name.clone()))
    }

    /// Repository an operation on `kind` targets when no repository is given.
    pub fn resolve(&self, kind: &EntityKind) -> ModelResult<Repository> {
        let name = context::resolve(kind.default_repository_name());
        self.repository(&name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> ModelResult<Vec<RepositoryName>> {
        let adapters = self
            .adapters
            .read()
            .map_err(|_| ModelError::configuration("repository registry lock poisoned"))?;
        let mut names: Vec<_> = adapters.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl core::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("RepositoryRegistry");
        match self.names() {
            Ok(names) => s.field("names", &names),
            Err(_) => s.field("names", &"<poisoned>"),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordkeep_core::{AttributeDescriptor, Primitive};

    fn kind(default_repository: Option<&str>) -> EntityKind {
        let builder = EntityKind::builder("Statistic")
            .property(AttributeDescriptor::serial("id"))
            .property(AttributeDescriptor::new("name", Primitive::String));
        let builder = match default_repository {
            Some(name) => builder.default_repository(name),
            None => builder,
        };
        builder.build().unwrap()
    }

    fn registry() -> RepositoryRegistry {
        let registry = RepositoryRegistry::new();
        registry.setup("default", InMemoryAdapter::new()).unwrap();
        registry.setup("alternate", InMemoryAdapter::new()).unwrap();
        registry
    }

    #[test]
    fn unknown_repository_is_reported_not_substituted() {
        let err = registry().repository(&RepositoryName::new("missing")).unwrap_err();
        assert_eq!(err, ModelError::UnknownRepository(RepositoryName::new("missing")));
    }

    #[test]
    fn resolve_uses_kind_default_at_base() {
        let registry = registry();
        assert_eq!(registry.resolve(&kind(None)).unwrap().name().as_str(), "default");
        assert_eq!(
            registry.resolve(&kind(Some("alternate"))).unwrap().name().as_str(),
            "alternate"
        );
    }

    #[test]
    fn resolve_uses_entered_scope() {
        let registry = registry();
        let statistic = kind(Some("alternate"));
        context::scope("default", || {
            assert!(registry.resolve(&statistic).unwrap().name().is_default());
        });
        context::scope("explicit", || {
            assert!(matches!(
                registry.resolve(&statistic),
                Err(ModelError::UnknownRepository(_))
            ));
        });
    }

    #[test]
    fn from_config_registers_each_repository() {
        let config = RepositoryConfig::from_names(["alternate"]).unwrap();
        let registry = RepositoryRegistry::from_config(&config).unwrap();
        assert_eq!(
            registry.names().unwrap(),
            vec![RepositoryName::new("alternate"), RepositoryName::new("default")]
        );
    }

    #[test]
    fn poisoned_lock_is_a_configuration_error() {
        let registry = registry();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _adapters = registry.adapters.write().unwrap();
            panic!("writer died");
        }));

        assert!(matches!(registry.names(), Err(ModelError::Configuration(_))));
        assert!(matches!(
            registry.repository(&RepositoryName::default_name()),
            Err(ModelError::Configuration(_))
        ));
        assert!(format!("{registry:?}").contains("<poisoned>"));
    }
}
