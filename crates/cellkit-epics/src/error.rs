//! Error types for the epics crate.

use thiserror::Error;

/// Errors raised by epics and the epic registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EpicError {
    /// An epic could not be constructed; fatal at startup.
    #[error("Epic '{epic}' failed to start: {reason}")]
    Construction { epic: String, reason: String },

    /// An epic's output reported a failure after start.
    #[error("Epic '{epic}' failed: {reason}")]
    Runtime { epic: String, reason: String },
}

impl EpicError {
    pub fn construction(epic: impl Into<String>, reason: impl Into<String>) -> Self {
        EpicError::Construction {
            epic: epic.into(),
            reason: reason.into(),
        }
    }

    pub fn runtime(epic: impl Into<String>, reason: impl Into<String>) -> Self {
        EpicError::Runtime {
            epic: epic.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error must abort startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, EpicError::Construction { .. })
    }
}
