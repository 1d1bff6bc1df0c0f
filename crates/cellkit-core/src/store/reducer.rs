//! Reducer: the only place application state changes.
//!
//! `reduce` consumes the current state and one action and returns the next
//! state. Actions that do not apply (unknown document, unknown cell, a
//! focus intent on a non-notebook) leave the state as it was.

use super::state::{AppState, ContentModel, DocumentState, NotebookModel};
use crate::action_bus::{Action, ConfigAction, DocumentAction, DocumentKind, FocusAction};
use crate::document::{Cell, ContentRef, DocumentModel, Notebook};
use crate::focus::{self, coordinator};

/// Apply one action, bumping `version` if anything changed
pub fn reduce(mut state: AppState, action: &Action) -> AppState {
    let changed = match action {
        Action::Config(action) => reduce_config(&mut state, action),
        Action::Focus(action) => reduce_focus(&mut state, action),
        Action::Document(action) => reduce_document(&mut state, action),
    };
    if changed {
        state.version += 1;
    }
    state
}

fn reduce_config(state: &mut AppState, action: &ConfigAction) -> bool {
    match action {
        ConfigAction::SetConfig { key, value } => {
            let previous = state.config.set(key.clone(), value.clone());
            previous.as_ref() != Some(value)
        }
        ConfigAction::MergeConfig { config } => {
            let before = state.config.clone();
            state.config.merge(config);
            state.config != before
        }
        ConfigAction::SaveConfig
        | ConfigAction::DoneSavingConfig
        | ConfigAction::SaveConfigFailed { .. }
        | ConfigAction::LoadConfig
        | ConfigAction::LoadConfigFailed { .. } => false,
    }
}

fn reduce_focus(state: &mut AppState, action: &FocusAction) -> bool {
    let content_ref = action.content_ref();
    let Some(model) = notebook_mut(state, &content_ref) else {
        tracing::debug!("Focus intent for {} ignored: no open notebook", content_ref);
        return false;
    };

    let before_focus = model.focus;
    let before_len = model.notebook.len();
    model.focus = focus::apply(&mut model.notebook, model.focus, action);
    model.focus != before_focus || model.notebook.len() != before_len
}

fn reduce_document(state: &mut AppState, action: &DocumentAction) -> bool {
    match action {
        DocumentAction::OpenDocument {
            content_ref,
            kind,
            cells,
        } => {
            let model = match kind {
                DocumentKind::Notebook => match Notebook::from_cells(cells.iter().cloned()) {
                    Ok(notebook) => ContentModel::Notebook(NotebookModel {
                        notebook,
                        focus: Default::default(),
                    }),
                    Err(err) => {
                        tracing::warn!("Refusing to open {}: {}", content_ref, err);
                        return false;
                    }
                },
                DocumentKind::Other(kind) => ContentModel::Other { kind: kind.clone() },
            };
            let opened_at = state.version + 1;
            state
                .documents
                .insert(*content_ref, DocumentState { opened_at, model });
            true
        }
        DocumentAction::CloseDocument { content_ref } => {
            state.documents.remove(content_ref).is_some()
        }
        DocumentAction::CreateCellAppend {
            content_ref,
            id,
            cell_type,
        } => {
            let Some(model) = notebook_mut(state, content_ref) else {
                return false;
            };
            match model.notebook.append_cell(Cell::empty(*cell_type).with_id(*id)) {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!("Cannot append cell to {}: {}", content_ref, err);
                    false
                }
            }
        }
        DocumentAction::CreateCellAfter {
            content_ref,
            after,
            id,
            cell_type,
        } => {
            let Some(model) = notebook_mut(state, content_ref) else {
                return false;
            };
            match model
                .notebook
                .insert_cell_after(after, Cell::empty(*cell_type).with_id(*id))
            {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!("Cannot insert cell into {}: {}", content_ref, err);
                    false
                }
            }
        }
        DocumentAction::DeleteCell { content_ref, id } => {
            let Some(model) = notebook_mut(state, content_ref) else {
                return false;
            };
            let order_before = model.notebook.cell_order().to_vec();
            if model.notebook.remove_cell(id).is_err() {
                return false;
            }
            model.focus = coordinator::reconcile_after_removal(&order_before, model.focus, id);
            true
        }
        DocumentAction::SetCellSource {
            content_ref,
            id,
            source,
        } => {
            let Some(model) = notebook_mut(state, content_ref) else {
                return false;
            };
            let unchanged = model
                .notebook
                .cell(id)
                .is_some_and(|cell| &cell.source == source);
            !unchanged && model.notebook.set_source(id, source.clone()).is_ok()
        }
        DocumentAction::Save { .. }
        | DocumentAction::SaveFulfilled { .. }
        | DocumentAction::SaveFailed { .. } => false,
    }
}

fn notebook_mut<'a>(
    state: &'a mut AppState,
    content_ref: &ContentRef,
) -> Option<&'a mut NotebookModel> {
    state
        .documents
        .get_mut(content_ref)
        .and_then(|doc| doc.model.as_notebook_mut())
}
