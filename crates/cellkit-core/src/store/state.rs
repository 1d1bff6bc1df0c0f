//! Application state threaded through the reducer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Config;
use crate::document::{ContentRef, Notebook};
use crate::focus::FocusState;

/// Whole-application state
///
/// `version` increases by one for every action that changed the state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub version: u64,
    /// Live configuration overrides (defaults are merged at read time)
    pub config: Config,
    pub documents: HashMap<ContentRef, DocumentState>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self, content_ref: &ContentRef) -> Option<&DocumentState> {
        self.documents.get(content_ref)
    }

    /// Token identifying the current session of a document, if open
    pub fn session(&self, content_ref: &ContentRef) -> Option<SessionToken> {
        self.documents.get(content_ref).map(|doc| SessionToken {
            content_ref: *content_ref,
            opened_at: doc.opened_at,
        })
    }

    /// Whether the session identified by `token` is still open
    ///
    /// A document closed and reopened under the same reference is a new
    /// session, so tokens from before the close are no longer live.
    pub fn is_session_live(&self, token: &SessionToken) -> bool {
        self.session(&token.content_ref).as_ref() == Some(token)
    }
}

/// Identity of one open document session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken {
    pub content_ref: ContentRef,
    /// State version at which the session was opened
    pub opened_at: u64,
}

/// State of one open document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    pub opened_at: u64,
    pub model: ContentModel,
}

/// Content held by an open document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentModel {
    /// Ordered cells with focus
    Notebook(NotebookModel),
    /// Any other kind of content
    Other { kind: String },
}

impl ContentModel {
    pub fn as_notebook(&self) -> Option<&NotebookModel> {
        match self {
            ContentModel::Notebook(model) => Some(model),
            ContentModel::Other { .. } => None,
        }
    }

    pub fn as_notebook_mut(&mut self) -> Option<&mut NotebookModel> {
        match self {
            ContentModel::Notebook(model) => Some(model),
            ContentModel::Other { .. } => None,
        }
    }
}

/// A notebook together with its focus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookModel {
    pub notebook: Notebook,
    pub focus: FocusState,
}
