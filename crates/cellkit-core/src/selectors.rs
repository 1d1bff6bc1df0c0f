//! Read-side projections of application state.
//!
//! The projections fail soft: a missing document, a missing cell or a
//! document that is not a notebook produces the unfocused/absent projection
//! instead of an error, since these run on read paths. `notebook_snapshot`
//! serves write paths and says why it found nothing.

use serde_json::{json, Value};

use crate::config::{deep_merge, Config};
use crate::document::{Cell, CellId, ContentRef, Notebook};
use crate::error::{DocumentError, Result};
use crate::store::{AppState, ContentModel, NotebookModel};

/// Config key holding markdown rendering overrides
pub const MARKDOWN_OPTIONS_KEY: &str = "markdownOptions";

/// Default markdown rendering options
pub fn markdown_option_defaults() -> Value {
    json!({ "linkTarget": "_blank" })
}

/// What a cell's view needs from the store
#[derive(Debug, Clone, PartialEq)]
pub struct CellProps {
    pub is_cell_focused: bool,
    pub is_editor_focused: bool,
    pub cell: Option<Cell>,
    pub markdown_options: Value,
}

/// Content model of an open document
pub fn model<'a>(state: &'a AppState, content_ref: &ContentRef) -> Option<&'a ContentModel> {
    state.document(content_ref).map(|doc| &doc.model)
}

/// Notebook model of an open document, if it is a notebook
pub fn notebook<'a>(state: &'a AppState, content_ref: &ContentRef) -> Option<&'a NotebookModel> {
    model(state, content_ref).and_then(ContentModel::as_notebook)
}

/// Owned copy of an open notebook, for handing to persistence
pub fn notebook_snapshot(state: &AppState, content_ref: &ContentRef) -> Result<Notebook> {
    let content = model(state, content_ref)
        .ok_or(DocumentError::UnknownDocument(*content_ref))?;
    let notebook = content
        .as_notebook()
        .ok_or(DocumentError::NotANotebook(*content_ref))?;
    Ok(notebook.notebook.clone())
}

pub fn cell_by_id<'a>(model: &'a NotebookModel, id: &CellId) -> Option<&'a Cell> {
    model.notebook.cell(id)
}

/// Option `key` deep-merged over `defaults`; the stored value wins
///
/// Only an object overrides. A stored `null` or scalar leaves the defaults
/// in place.
pub fn options_with_defaults(config: &Config, key: &str, defaults: Value) -> Value {
    let mut merged = defaults;
    match config.get(key) {
        Some(stored @ Value::Object(_)) => deep_merge(&mut merged, stored),
        Some(Value::Null) | None => {}
        Some(other) => {
            tracing::debug!("Ignoring non-object option {} = {}", key, other);
        }
    }
    merged
}

/// Effective markdown rendering options
pub fn markdown_options(config: &Config) -> Value {
    options_with_defaults(config, MARKDOWN_OPTIONS_KEY, markdown_option_defaults())
}

/// Project the state for one cell of one document
pub fn cell_props(state: &AppState, content_ref: &ContentRef, id: &CellId) -> CellProps {
    let markdown_options = markdown_options(&state.config);

    match notebook(state, content_ref) {
        Some(model) => CellProps {
            is_cell_focused: model.focus.is_cell_focused(id),
            is_editor_focused: model.focus.is_editor_focused(id),
            cell: cell_by_id(model, id).cloned(),
            markdown_options,
        },
        None => CellProps {
            is_cell_focused: false,
            is_editor_focused: false,
            cell: None,
            markdown_options,
        },
    }
}

/// Selector bound to one cell, for consumers that re-read on every change
pub fn cell_props_selector(
    content_ref: ContentRef,
    id: CellId,
) -> impl Fn(&AppState) -> CellProps {
    move |state| cell_props(state, &content_ref, &id)
}
