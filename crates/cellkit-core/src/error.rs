//! Error handling for Cellkit
//!
//! Provides error types for the layers of the coordination core:
//! - Bus errors (subscriber failures reported to the error sink)
//! - Document errors (cell/document lookups and structural edits)
//! - Persistence errors (reported by external collaborators)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::action_bus::SubscriptionId;
use crate::document::{CellId, ContentRef};

/// Action bus error type
///
/// These are never returned to a dispatcher. The bus hands them to its
/// error sink so a failing subscriber cannot affect the others.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A subscriber panicked while handling an action
    #[error("Subscriber {subscription} panicked while handling {action}: {message}")]
    SubscriberPanicked {
        /// The subscription whose handler panicked.
        subscription: SubscriptionId,
        /// Tag of the action being delivered.
        action: &'static str,
        /// Panic payload rendered as text.
        message: String,
    },
}

/// Document model error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// No document is open under this reference
    #[error("Unknown document {0}")]
    UnknownDocument(ContentRef),

    /// The document is open but is not a notebook
    #[error("Document {0} is not a notebook")]
    NotANotebook(ContentRef),

    /// No cell with this id exists in the document
    #[error("Unknown cell {0}")]
    UnknownCell(CellId),

    /// A cell with this id already exists in the document
    #[error("Duplicate cell id {0}")]
    DuplicateCell(CellId),
}

/// Persistence error type
///
/// Reported by the persistence collaborators. Cloneable so it can be turned
/// into a failure action without losing the original.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Underlying storage could not be read or written
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The backend is not available
    #[error("Persistence backend unavailable: {0}")]
    Unavailable(String),
}

/// Main error type for Cellkit
///
/// A unified error type that can represent any error from the core layers.
/// Write paths that look a document up and then persist it return this, so
/// both failure kinds travel through one `?` chain.
#[derive(Error, Debug)]
pub enum Error {
    /// Bus error
    #[error(transparent)]
    Bus(#[from] BusError),

    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl Error {
    /// Check if this is a persistence error
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_display() {
        let id = CellId::new();
        let err = DocumentError::UnknownCell(id);
        assert_eq!(err.to_string(), format!("Unknown cell {}", id));
    }

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::Io("disk full".to_string());
        assert_eq!(err.to_string(), "Storage I/O failed: disk full");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = DocumentError::DuplicateCell(CellId::new()).into();
        assert!(matches!(err, Error::Document(DocumentError::DuplicateCell(_))));
        assert!(!err.is_persistence_error());

        let err: Error = PersistenceError::Unavailable("offline".to_string()).into();
        assert!(err.is_persistence_error());
    }
}
