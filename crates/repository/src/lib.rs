//! `recordkeep-repository` — repositories, the adapter boundary and the
//! repository context resolver.

pub mod adapter;
pub mod config;
pub mod context;
pub mod in_memory;
pub mod registry;
pub mod repository;

pub use adapter::Adapter;
pub use config::{AdapterKind, REPOSITORIES_ENV, RepositoryConfig, RepositorySettings};
pub use context::{ScopeGuard, ScopeStack};
pub use in_memory::InMemoryAdapter;
pub use registry::RepositoryRegistry;
pub use repository::Repository;
