//! Dispatch facade for cell views.
//!
//! A `CellDispatcher` is bound to one cell of one document and is the only
//! sanctioned way for a view to request a focus change. Moving up or down is
//! a two-step move: a cell-focus intent followed by an editor-focus intent.
//! The two are dispatched separately and applied as independent
//! transitions, so an observer may see the state between them.

use std::sync::Arc;

use crate::action_bus::{Action, ActionBus, FocusAction};
use crate::document::{CellId, ContentRef};

/// Ordered pair of intents making up one focus move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusMove {
    /// Dispatched first.
    pub cell: FocusAction,
    /// Dispatched second.
    pub editor: FocusAction,
}

impl FocusMove {
    /// Move focus to the cell and editor above `id`
    pub fn above(content_ref: ContentRef, id: CellId) -> Self {
        Self {
            cell: FocusAction::FocusPreviousCell { content_ref, id },
            editor: FocusAction::FocusPreviousCellEditor { content_ref, id },
        }
    }

    /// Move focus to the cell and editor below `id`, creating a cell at the
    /// end of the document
    pub fn below(content_ref: ContentRef, id: CellId) -> Self {
        Self {
            cell: FocusAction::FocusNextCell {
                content_ref,
                id,
                create_cell_if_undefined: true,
            },
            editor: FocusAction::FocusNextCellEditor { content_ref, id },
        }
    }

    /// Both intents in dispatch order
    pub fn into_actions(self) -> [Action; 2] {
        [Action::Focus(self.cell), Action::Focus(self.editor)]
    }
}

/// Focus intents for one cell
#[derive(Debug, Clone)]
pub struct CellDispatcher {
    bus: Arc<ActionBus>,
    content_ref: ContentRef,
    id: CellId,
}

impl CellDispatcher {
    pub fn new(bus: Arc<ActionBus>, content_ref: ContentRef, id: CellId) -> Self {
        Self {
            bus,
            content_ref,
            id,
        }
    }

    pub fn content_ref(&self) -> ContentRef {
        self.content_ref
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    /// Focus the cell above, then its editor
    pub fn focus_above_cell(&self) {
        self.dispatch_move(FocusMove::above(self.content_ref, self.id));
    }

    /// Focus the cell below (creating one at the end), then its editor
    pub fn focus_below_cell(&self) {
        self.dispatch_move(FocusMove::below(self.content_ref, self.id));
    }

    /// Focus this cell's editor
    pub fn focus_editor(&self) {
        self.bus.dispatch(FocusAction::FocusCellEditor {
            content_ref: self.content_ref,
            id: Some(self.id),
        });
    }

    /// Unfocus the editor, leaving cell focus alone
    pub fn unfocus_editor(&self) {
        self.bus.dispatch(FocusAction::FocusCellEditor {
            content_ref: self.content_ref,
            id: None,
        });
    }

    fn dispatch_move(&self, focus_move: FocusMove) {
        for action in focus_move.into_actions() {
            self.bus.dispatch(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_bus::{ActionCategory, ActionFilter, DocumentAction, DocumentKind};
    use crate::document::{Cell, CellType, DocumentModel};
    use crate::selectors::{cell_props, notebook};
    use crate::store::Store;
    use parking_lot::Mutex;

    fn recorded_tags(bus: &ActionBus) -> Arc<Mutex<Vec<&'static str>>> {
        let tags = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&tags);
        bus.subscribe(
            ActionFilter::Categories(vec![ActionCategory::Focus]),
            move |action| sink.lock().push(action.tag()),
        );
        tags
    }

    #[test]
    fn test_focus_move_order() {
        let content_ref = ContentRef::new();
        let id = CellId::new();
        let [first, second] = FocusMove::below(content_ref, id).into_actions();
        assert_eq!(first.tag(), "FOCUS_NEXT_CELL");
        assert_eq!(second.tag(), "FOCUS_NEXT_CELL_EDITOR");

        let [first, second] = FocusMove::above(content_ref, id).into_actions();
        assert_eq!(first.tag(), "FOCUS_PREVIOUS_CELL");
        assert_eq!(second.tag(), "FOCUS_PREVIOUS_CELL_EDITOR");
    }

    #[test]
    fn test_dispatcher_emits_cell_intent_before_editor_intent() {
        let bus = Arc::new(ActionBus::new());
        let tags = recorded_tags(&bus);
        let dispatcher = CellDispatcher::new(Arc::clone(&bus), ContentRef::new(), CellId::new());

        dispatcher.focus_above_cell();
        dispatcher.focus_below_cell();
        dispatcher.focus_editor();
        dispatcher.unfocus_editor();

        assert_eq!(
            *tags.lock(),
            vec![
                "FOCUS_PREVIOUS_CELL",
                "FOCUS_PREVIOUS_CELL_EDITOR",
                "FOCUS_NEXT_CELL",
                "FOCUS_NEXT_CELL_EDITOR",
                "FOCUS_CELL_EDITOR",
                "FOCUS_CELL_EDITOR",
            ]
        );
    }

    #[test]
    fn test_focus_below_last_cell_through_store() {
        let bus = Arc::new(ActionBus::new());
        let store = Arc::new(Store::default());
        store.attach(&bus);

        let content_ref = ContentRef::new();
        let cell = Cell::empty(CellType::Markdown);
        bus.dispatch(DocumentAction::OpenDocument {
            content_ref,
            kind: DocumentKind::Notebook,
            cells: vec![cell.clone()],
        });

        let dispatcher = CellDispatcher::new(Arc::clone(&bus), content_ref, cell.id);
        dispatcher.focus_editor();
        dispatcher.focus_below_cell();

        let state = store.state();
        let model = notebook(&state, &content_ref).expect("notebook");
        assert_eq!(model.notebook.len(), 2);
        let created = model.notebook.cell_order()[1];
        assert!(cell_props(&state, &content_ref, &created).is_cell_focused);
        assert!(cell_props(&state, &content_ref, &created).is_editor_focused);

        dispatcher.unfocus_editor();
        let props = cell_props(&store.state(), &content_ref, &created);
        assert!(props.is_cell_focused);
        assert!(!props.is_editor_focused);
    }
}
