//! Focus transitions.
//!
//! Every function here is pure with respect to focus: it takes the current
//! document order and `FocusState` and returns the next `FocusState`. The
//! only side effect is `focus_next_cell` appending a cell through the
//! `DocumentModel` when asked to create one.
//!
//! Navigation follows document order only. An intent is resolved against
//! the order at the moment it is applied.

use super::FocusState;
use crate::action_bus::FocusAction;
use crate::document::{CellId, CellType, DocumentModel};

/// Cell directly above `current`, if any
pub fn previous_cell(order: &[CellId], current: Option<&CellId>) -> Option<CellId> {
    let current = current?;
    let index = order.iter().position(|id| id == current)?;
    index.checked_sub(1).map(|above| order[above])
}

/// Cell directly below `current`, if any
pub fn next_cell(order: &[CellId], current: Option<&CellId>) -> Option<CellId> {
    let current = current?;
    let index = order.iter().position(|id| id == current)?;
    order.get(index + 1).copied()
}

/// Focus the cell above `current`; unchanged at the top or when `current`
/// is not in the document
pub fn focus_previous_cell(
    order: &[CellId],
    state: FocusState,
    current: Option<&CellId>,
) -> FocusState {
    match previous_cell(order, current) {
        Some(above) => state.with_cell(Some(above)),
        None => state,
    }
}

/// Focus the cell below `current`
///
/// At the bottom, a new empty cell is appended and focused when
/// `create_cell_if_undefined` is set; otherwise focus is unchanged. The new
/// cell is a code cell when `current` is one, markdown otherwise.
pub fn focus_next_cell<D: DocumentModel>(
    document: &mut D,
    state: FocusState,
    current: Option<&CellId>,
    create_cell_if_undefined: bool,
) -> FocusState {
    let Some(current) = current else {
        return state;
    };
    let order = document.cell_order();
    let Some(index) = order.iter().position(|id| id == current) else {
        return state;
    };

    if let Some(below) = order.get(index + 1).copied() {
        return state.with_cell(Some(below));
    }
    if !create_cell_if_undefined {
        return state;
    }

    let cell_type = match document.cell_type(current) {
        Some(CellType::Code) => CellType::Code,
        _ => CellType::Markdown,
    };
    let created = document.append_empty_cell(cell_type);
    tracing::debug!("Appended {} cell {} while moving focus down", cell_type, created);
    state.with_cell(Some(created))
}

/// Focus the editor above `current`; unchanged at the top
pub fn focus_previous_cell_editor(
    order: &[CellId],
    state: FocusState,
    current: Option<&CellId>,
) -> FocusState {
    match previous_cell(order, current) {
        Some(above) => state.with_editor(Some(above)),
        None => state,
    }
}

/// Focus the editor below `current`; unchanged at the bottom
pub fn focus_next_cell_editor(
    order: &[CellId],
    state: FocusState,
    current: Option<&CellId>,
) -> FocusState {
    match next_cell(order, current) {
        Some(below) => state.with_editor(Some(below)),
        None => state,
    }
}

/// Focus a specific cell; ids outside the document are ignored
pub fn focus_cell(order: &[CellId], state: FocusState, id: &CellId) -> FocusState {
    if order.contains(id) {
        state.with_cell(Some(*id))
    } else {
        tracing::debug!("Ignoring focus request for unknown {}", id);
        state
    }
}

/// Focus the editor of `target`, or unfocus the editor when `None`
///
/// Cell focus is never touched. Ids outside the document are ignored so the
/// focused editor always names a current cell.
pub fn focus_cell_editor(
    order: &[CellId],
    state: FocusState,
    target: Option<&CellId>,
) -> FocusState {
    match target {
        None => state.with_editor(None),
        Some(id) if order.contains(id) => state.with_editor(Some(*id)),
        Some(id) => {
            tracing::debug!("Ignoring editor focus request for unknown {}", id);
            state
        }
    }
}

/// Repair focus after `removed` was deleted
///
/// `order_before` is the cell order prior to the removal. A focused cell
/// that was removed hands focus to the cell that took its place, or to the
/// new last cell. An editor focused on the removed cell is unfocused.
pub fn reconcile_after_removal(
    order_before: &[CellId],
    state: FocusState,
    removed: &CellId,
) -> FocusState {
    let mut next = state;

    if state.focused_cell() == Some(removed) {
        let index = order_before.iter().position(|id| id == removed);
        let replacement = index.and_then(|index| {
            order_before
                .get(index + 1)
                .or_else(|| index.checked_sub(1).and_then(|above| order_before.get(above)))
                .copied()
        });
        next = next.with_cell(replacement);
    }
    if state.focused_editor() == Some(removed) {
        next = next.with_editor(None);
    }
    next
}

/// Apply one focus intent
pub fn apply<D: DocumentModel>(
    document: &mut D,
    state: FocusState,
    action: &FocusAction,
) -> FocusState {
    match action {
        FocusAction::FocusCell { id, .. } => focus_cell(document.cell_order(), state, id),
        FocusAction::FocusPreviousCell { id, .. } => {
            focus_previous_cell(document.cell_order(), state, Some(id))
        }
        FocusAction::FocusNextCell {
            id,
            create_cell_if_undefined,
            ..
        } => focus_next_cell(document, state, Some(id), *create_cell_if_undefined),
        FocusAction::FocusPreviousCellEditor { id, .. } => {
            focus_previous_cell_editor(document.cell_order(), state, Some(id))
        }
        FocusAction::FocusNextCellEditor { id, .. } => {
            focus_next_cell_editor(document.cell_order(), state, Some(id))
        }
        FocusAction::FocusCellEditor { id, .. } => {
            focus_cell_editor(document.cell_order(), state, id.as_ref())
        }
    }
}
