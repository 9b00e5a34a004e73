//! Error types for implore-link
//!
//! The engine itself is best-effort: filtering, color derivation and
//! highlighting never fail. Errors only surface at the edges:
//! - Loading a record set (duplicate ids)
//! - Parsing and validating configuration
//! - Talking to an external selection consumer

use thiserror::Error;

use crate::store::EntityId;

/// Main error type for implore-link operations
#[derive(Error, Debug)]
pub enum LinkError {
    /// Two records share an id
    #[error("Duplicate record id: {id}")]
    DuplicateId { id: EntityId },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Colormap name not known
    #[error("Unknown colormap: {name}")]
    UnknownColormap { name: String },

    /// Configuration could not be decoded
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by a selection publisher
///
/// These are logged by the engine and never propagated to views.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The external consumer is not connected
    #[error("External consumer unavailable")]
    Unavailable,

    /// The consumer refused the payload
    #[error("Payload rejected: {0}")]
    Rejected(String),

    /// The payload could not be encoded
    #[error("Failed to encode payload: {0}")]
    Encode(String),
}

/// Result type alias for implore-link operations
pub type LinkResult<T> = Result<T, LinkError>;

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
