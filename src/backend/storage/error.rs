//! Typed storage errors.
//!
//! Every repository operation reports a distinguishable failure kind so
//! callers can react to a failed save instead of discovering it in a log
//! file. Services wrap these in `anyhow::Error` with context; the kind
//! stays reachable through `downcast_ref::<StorageError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A fetch from the backing files failed (I/O, parse, missing header).
    #[error("failed to read {entity} data: {reason}")]
    ReadFailed { entity: &'static str, reason: String },

    /// A save to the backing files failed.
    #[error("failed to write {entity} data: {reason}")]
    WriteFailed { entity: &'static str, reason: String },

    /// A category lookup during link resolution failed.
    #[error("failed to resolve category '{name}': {reason}")]
    CategoryResolution { name: String, reason: String },

    /// The record a caller referenced does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

impl StorageError {
    pub fn read(entity: &'static str, source: impl std::fmt::Display) -> Self {
        StorageError::ReadFailed {
            entity,
            reason: source.to_string(),
        }
    }

    pub fn write(entity: &'static str, source: impl std::fmt::Display) -> Self {
        StorageError::WriteFailed {
            entity,
            reason: source.to_string(),
        }
    }

    pub fn category_resolution(name: &str, source: impl std::fmt::Display) -> Self {
        StorageError::CategoryResolution {
            name: name.to_string(),
            reason: source.to_string(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
