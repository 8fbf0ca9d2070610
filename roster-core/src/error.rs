//! Error types and result types for store operations.
//!
//! Every fallible call in the workspace returns [`StoreResult<T>`]. Lookups that
//! match nothing are not errors: they come back as `Ok(None)` or an empty `Vec`.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record failed validation before it reached the store.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Conversion between a typed record and BSON/JSON failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The store could not be set up (bad connection string, unreachable server).
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The document to write back is no longer in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for [`StoreError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = StoreError::DocumentNotFound("abc".into(), "people".into());
        assert_eq!(err.to_string(), "Document not found abc in collection people");
    }

    #[test]
    fn validation_is_detected() {
        assert!(StoreError::Validation("name is required".into()).is_validation());
        assert!(!StoreError::Backend("down".into()).is_validation());
    }
}
