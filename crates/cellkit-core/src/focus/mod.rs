//! # Focus Coordination
//!
//! Tracks which cell and which embedded editor own input focus in one open
//! document, and computes the next focus target for each focus intent.
//!
//! Cell focus and editor focus are independent: moving one never moves the
//! other. The view layer asks for a two-step move (cell, then editor) as two
//! separate intents; see `dispatch::FocusMove`.

pub mod coordinator;

use serde::{Deserialize, Serialize};

use crate::document::CellId;

pub use coordinator::apply;

/// Focus of one open document
///
/// Both fields start empty when a document opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    focused_cell: Option<CellId>,
    focused_editor: Option<CellId>,
}

impl FocusState {
    /// Cell that currently has focus
    pub fn focused_cell(&self) -> Option<&CellId> {
        self.focused_cell.as_ref()
    }

    /// Cell whose editor currently has focus
    pub fn focused_editor(&self) -> Option<&CellId> {
        self.focused_editor.as_ref()
    }

    pub fn is_cell_focused(&self, id: &CellId) -> bool {
        self.focused_cell.as_ref() == Some(id)
    }

    pub fn is_editor_focused(&self, id: &CellId) -> bool {
        self.focused_editor.as_ref() == Some(id)
    }

    pub fn with_cell(self, cell: Option<CellId>) -> Self {
        Self {
            focused_cell: cell,
            ..self
        }
    }

    pub fn with_editor(self, editor: Option<CellId>) -> Self {
        Self {
            focused_editor: editor,
            ..self
        }
    }
}
