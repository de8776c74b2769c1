//! `recordkeep-resource` — records, attribute state tracking and model
//! lifecycle operations.
//!
//! A [`Model`] ties an entity kind to the registered repositories. Records it
//! produces track which attributes changed since their last synchronization
//! point, and resolve their repository through the repository context.

pub mod model;
pub mod record;
pub mod state;

pub use model::Model;
pub use record::Record;
pub use state::{AttributeState, Transition};

pub use recordkeep_core::{
    AdapterError, AttributeDescriptor, AttributeMap, AttributeValue, EntityKind, ModelError,
    ModelResult, Primitive, PropertyRegistry, RecordKey, RepositoryName, Value,
};
pub use recordkeep_repository::{
    Adapter, InMemoryAdapter, Repository, RepositoryConfig, RepositoryRegistry, context,
};
