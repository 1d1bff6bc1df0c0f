//! Action type definitions for the action bus.
//!
//! Actions are immutable intents or facts, grouped by feature area. They
//! carry data only and are cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::document::{Cell, CellId, CellType, ContentRef};

/// Root action enum for every dispatched action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Configuration changes and persistence
    Config(ConfigAction),
    /// Cell and editor focus intents
    Focus(FocusAction),
    /// Document lifecycle and structure
    Document(DocumentAction),
}

impl Action {
    /// Get the category of this action
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::Config(_) => ActionCategory::Config,
            Action::Focus(_) => ActionCategory::Focus,
            Action::Document(_) => ActionCategory::Document,
        }
    }

    /// Stable upper-snake tag identifying the action kind
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Config(a) => a.tag(),
            Action::Focus(a) => a.tag(),
            Action::Document(a) => a.tag(),
        }
    }

    /// Document the action is scoped to, if any
    pub fn content_ref(&self) -> Option<ContentRef> {
        match self {
            Action::Config(_) => None,
            Action::Focus(a) => Some(a.content_ref()),
            Action::Document(a) => Some(a.content_ref()),
        }
    }
}

impl From<ConfigAction> for Action {
    fn from(action: ConfigAction) -> Self {
        Action::Config(action)
    }
}

impl From<FocusAction> for Action {
    fn from(action: FocusAction) -> Self {
        Action::Focus(action)
    }
}

impl From<DocumentAction> for Action {
    fn from(action: DocumentAction) -> Self {
        Action::Document(action)
    }
}

/// Action category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    /// Configuration actions.
    Config,
    /// Focus actions.
    Focus,
    /// Document actions.
    Document,
}

impl std::fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionCategory::Config => write!(f, "Config"),
            ActionCategory::Focus => write!(f, "Focus"),
            ActionCategory::Document => write!(f, "Document"),
        }
    }
}

/// Configuration actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigAction {
    /// An option was changed.
    SetConfig {
        /// Option name.
        key: String,
        /// New option value.
        value: Value,
    },
    /// The live configuration should be persisted.
    SaveConfig,
    /// Persisting the configuration finished.
    DoneSavingConfig,
    /// Persisting the configuration failed.
    SaveConfigFailed {
        /// Error reported by the persistence collaborator.
        error: String,
    },
    /// The persisted configuration should be loaded.
    LoadConfig,
    /// Loaded options to merge over the live configuration.
    MergeConfig {
        /// Options read from storage.
        config: Config,
    },
    /// Loading the configuration failed.
    LoadConfigFailed {
        /// Error reported by the persistence collaborator.
        error: String,
    },
}

impl ConfigAction {
    fn tag(&self) -> &'static str {
        match self {
            ConfigAction::SetConfig { .. } => "SET_CONFIG",
            ConfigAction::SaveConfig => "SAVE_CONFIG",
            ConfigAction::DoneSavingConfig => "DONE_SAVING_CONFIG",
            ConfigAction::SaveConfigFailed { .. } => "SAVE_CONFIG_FAILED",
            ConfigAction::LoadConfig => "LOAD_CONFIG",
            ConfigAction::MergeConfig { .. } => "MERGE_CONFIG",
            ConfigAction::LoadConfigFailed { .. } => "LOAD_CONFIG_FAILED",
        }
    }
}

/// Focus intents, each scoped to one open document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusAction {
    /// Focus a specific cell.
    FocusCell {
        /// Document the cell belongs to.
        content_ref: ContentRef,
        /// Cell to focus.
        id: CellId,
    },
    /// Move cell focus to the cell above `id`.
    FocusPreviousCell {
        /// Document the cell belongs to.
        content_ref: ContentRef,
        /// Cell the move starts from.
        id: CellId,
    },
    /// Move cell focus to the cell below `id`.
    FocusNextCell {
        /// Document the cell belongs to.
        content_ref: ContentRef,
        /// Cell the move starts from.
        id: CellId,
        /// Append a new cell when `id` is the last one.
        create_cell_if_undefined: bool,
    },
    /// Move editor focus to the editor above `id`.
    FocusPreviousCellEditor {
        /// Document the cell belongs to.
        content_ref: ContentRef,
        /// Cell the move starts from.
        id: CellId,
    },
    /// Move editor focus to the editor below `id`.
    FocusNextCellEditor {
        /// Document the cell belongs to.
        content_ref: ContentRef,
        /// Cell the move starts from.
        id: CellId,
    },
    /// Focus the editor of `id`, or unfocus the editor when `None`.
    FocusCellEditor {
        /// Document the cell belongs to.
        content_ref: ContentRef,
        /// Editor to focus; `None` unfocuses.
        id: Option<CellId>,
    },
}

impl FocusAction {
    fn tag(&self) -> &'static str {
        match self {
            FocusAction::FocusCell { .. } => "FOCUS_CELL",
            FocusAction::FocusPreviousCell { .. } => "FOCUS_PREVIOUS_CELL",
            FocusAction::FocusNextCell { .. } => "FOCUS_NEXT_CELL",
            FocusAction::FocusPreviousCellEditor { .. } => "FOCUS_PREVIOUS_CELL_EDITOR",
            FocusAction::FocusNextCellEditor { .. } => "FOCUS_NEXT_CELL_EDITOR",
            FocusAction::FocusCellEditor { .. } => "FOCUS_CELL_EDITOR",
        }
    }

    pub fn content_ref(&self) -> ContentRef {
        match self {
            FocusAction::FocusCell { content_ref, .. }
            | FocusAction::FocusPreviousCell { content_ref, .. }
            | FocusAction::FocusNextCell { content_ref, .. }
            | FocusAction::FocusPreviousCellEditor { content_ref, .. }
            | FocusAction::FocusNextCellEditor { content_ref, .. }
            | FocusAction::FocusCellEditor { content_ref, .. } => *content_ref,
        }
    }
}

/// Kind of document opened under a content reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Ordered cells with focus state.
    Notebook,
    /// Any other content (plain files, directories); carries no cells.
    Other(String),
}

/// Document lifecycle and structure actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentAction {
    /// A document session was opened.
    OpenDocument {
        /// Reference for the new session.
        content_ref: ContentRef,
        /// What kind of document it is.
        kind: DocumentKind,
        /// Initial cells in order (ignored for non-notebooks).
        cells: Vec<Cell>,
    },
    /// A document session was closed.
    CloseDocument {
        /// Session being closed.
        content_ref: ContentRef,
    },
    /// Append an empty cell.
    CreateCellAppend {
        /// Target document.
        content_ref: ContentRef,
        /// Id for the new cell.
        id: CellId,
        /// Type of the new cell.
        cell_type: CellType,
    },
    /// Insert an empty cell directly below another.
    CreateCellAfter {
        /// Target document.
        content_ref: ContentRef,
        /// Cell to insert below.
        after: CellId,
        /// Id for the new cell.
        id: CellId,
        /// Type of the new cell.
        cell_type: CellType,
    },
    /// Remove a cell.
    DeleteCell {
        /// Target document.
        content_ref: ContentRef,
        /// Cell to remove.
        id: CellId,
    },
    /// Replace a cell's source text.
    SetCellSource {
        /// Target document.
        content_ref: ContentRef,
        /// Cell to update.
        id: CellId,
        /// New source text.
        source: String,
    },
    /// The document should be persisted.
    Save {
        /// Document to save.
        content_ref: ContentRef,
    },
    /// Persisting the document finished.
    SaveFulfilled {
        /// Document that was saved.
        content_ref: ContentRef,
    },
    /// Persisting the document failed.
    SaveFailed {
        /// Document that failed to save.
        content_ref: ContentRef,
        /// Error reported by the persistence collaborator.
        error: String,
    },
}

impl DocumentAction {
    fn tag(&self) -> &'static str {
        match self {
            DocumentAction::OpenDocument { .. } => "OPEN_DOCUMENT",
            DocumentAction::CloseDocument { .. } => "CLOSE_DOCUMENT",
            DocumentAction::CreateCellAppend { .. } => "CREATE_CELL_APPEND",
            DocumentAction::CreateCellAfter { .. } => "CREATE_CELL_AFTER",
            DocumentAction::DeleteCell { .. } => "DELETE_CELL",
            DocumentAction::SetCellSource { .. } => "SET_CELL_SOURCE",
            DocumentAction::Save { .. } => "SAVE",
            DocumentAction::SaveFulfilled { .. } => "SAVE_FULFILLED",
            DocumentAction::SaveFailed { .. } => "SAVE_FAILED",
        }
    }

    pub fn content_ref(&self) -> ContentRef {
        match self {
            DocumentAction::OpenDocument { content_ref, .. }
            | DocumentAction::CloseDocument { content_ref }
            | DocumentAction::CreateCellAppend { content_ref, .. }
            | DocumentAction::CreateCellAfter { content_ref, .. }
            | DocumentAction::DeleteCell { content_ref, .. }
            | DocumentAction::SetCellSource { content_ref, .. }
            | DocumentAction::Save { content_ref }
            | DocumentAction::SaveFulfilled { content_ref }
            | DocumentAction::SaveFailed { content_ref, .. } => *content_ref,
        }
    }

    /// Append an empty cell with a freshly generated id
    pub fn create_cell_append(content_ref: ContentRef, cell_type: CellType) -> Self {
        DocumentAction::CreateCellAppend {
            content_ref,
            id: CellId::new(),
            cell_type,
        }
    }
}
