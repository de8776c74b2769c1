use std::sync::Arc;

use recordkeep_core::RepositoryName;

use crate::adapter::Adapter;
use crate::context::{self, ScopeGuard};

/// A named backing data store: a repository name bound to its adapter.
///
/// Two handles are equal when they name the same repository.
#[derive(Clone)]
pub struct Repository {
    name: RepositoryName,
    adapter: Arc<dyn Adapter>,
}

impl Repository {
    pub fn new(name: RepositoryName, adapter: Arc<dyn Adapter>) -> Self {
        Self { name, adapter }
    }

    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    /// Make this repository the current scope until the guard is dropped.
    pub fn enter(&self) -> ScopeGuard {
        context::enter(self.name.clone())
    }

    /// Run `body` with this repository as the current scope.
    pub fn scope<T>(&self, body: impl FnOnce(&Repository) -> T) -> T {
        let _guard = self.enter();
        body(self)
    }
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Repository {}

impl core::fmt::Debug for Repository {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Repository").field("name", &self.name).finish_non_exhaustive()
    }
}

impl core::fmt::Display for Repository {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.name, f)
    }
}
