//! `recordkeep-core` — schema and value building blocks.
//!
//! This crate contains the **property registry** layer: entity kinds, attribute
//! descriptors, value validation and the error taxonomy. It has no knowledge of
//! records or repositories.

pub mod error;
pub mod id;
pub mod kind;
pub mod property;
pub mod registry;
pub mod value;

pub use error::{AdapterError, ModelError, ModelResult};
pub use id::{DEFAULT_REPOSITORY, RecordKey, RepositoryName};
pub use kind::{EntityKind, EntityKindBuilder};
pub use property::{AttributeDescriptor, Primitive, validate};
pub use registry::PropertyRegistry;
pub use value::{AttributeValue, Value};

/// Attribute name → value, ordered by name.
pub type AttributeMap = std::collections::BTreeMap<String, AttributeValue>;
