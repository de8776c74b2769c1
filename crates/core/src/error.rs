//! Model error taxonomy.

use thiserror::Error;

use crate::id::RepositoryName;

/// Result type used across the model layer.
pub type ModelResult<T> = Result<T, ModelError>;

/// Model-level error.
///
/// Every variant is reported to the immediate caller. Nothing in the core
/// retries or recovers internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A value failed its descriptor's type contract.
    #[error("invalid value for `{attribute}`: {reason}")]
    InvalidValue { attribute: String, reason: String },

    /// An attribute name is not part of the entity kind.
    #[error("unknown attribute `{attribute}` on `{kind}`")]
    UnknownAttribute { kind: String, attribute: String },

    /// An entity kind was never defined in the property registry.
    #[error("unknown entity kind `{0}`")]
    UnknownKind(String),

    /// A repository name has no registered backing store.
    #[error("unknown repository `{0}`")]
    UnknownRepository(RepositoryName),

    /// Programmer error in schema or repository setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure reported by a storage adapter, propagated unchanged.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ModelError {
    pub fn invalid_value(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_attribute(kind: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            kind: kind.into(),
            attribute: attribute.into(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Storage adapter failure.
///
/// Opaque to the state tracker: a failed persist never reaches `sync`, so the
/// record keeps its dirty attributes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// An update addressed a row the adapter does not hold.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A create collided with an existing key.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The record cannot be addressed because a key attribute is unset.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Any other backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
}

impl AdapterError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
