use std::sync::Arc;

use cellkit_core::selectors::{cell_props, notebook};
use cellkit_core::{
    ActionBus, Cell, CellId, CellType, ContentRef, DocumentAction, DocumentKind, DocumentModel,
    FocusAction, Store,
};

struct Session {
    bus: ActionBus,
    store: Arc<Store>,
    content_ref: ContentRef,
    cells: Vec<CellId>,
}

impl Session {
    fn open(types: &[CellType]) -> Self {
        let bus = ActionBus::new();
        let store = Arc::new(Store::default());
        store.attach(&bus);

        let cells: Vec<Cell> = types.iter().map(|t| Cell::empty(*t)).collect();
        let ids = cells.iter().map(|cell| cell.id).collect();
        let content_ref = ContentRef::new();
        bus.dispatch(DocumentAction::OpenDocument {
            content_ref,
            kind: DocumentKind::Notebook,
            cells,
        });

        Self {
            bus,
            store,
            content_ref,
            cells: ids,
        }
    }

    fn focused(&self) -> (Option<CellId>, Option<CellId>) {
        let state = self.store.state();
        let model = notebook(&state, &self.content_ref).expect("open notebook");
        (
            model.focus.focused_cell().copied(),
            model.focus.focused_editor().copied(),
        )
    }

    fn len(&self) -> usize {
        let state = self.store.state();
        notebook(&state, &self.content_ref)
            .map(|model| model.notebook.len())
            .unwrap_or_default()
    }

    fn order(&self) -> Vec<CellId> {
        let state = self.store.state();
        notebook(&state, &self.content_ref)
            .map(|model| model.notebook.cell_order().to_vec())
            .unwrap_or_default()
    }
}

#[test]
fn test_new_document_has_no_focus() {
    let session = Session::open(&[CellType::Code, CellType::Markdown]);
    assert_eq!(session.focused(), (None, None));
}

#[test]
fn test_previous_on_first_cell_is_noop() {
    let session = Session::open(&[CellType::Code, CellType::Markdown]);
    let first = session.cells[0];
    session.bus.dispatch(FocusAction::FocusCell {
        content_ref: session.content_ref,
        id: first,
    });
    let version = session.store.state().version;

    session.bus.dispatch(FocusAction::FocusPreviousCell {
        content_ref: session.content_ref,
        id: first,
    });
    assert_eq!(session.focused(), (Some(first), None));
    assert_eq!(session.store.state().version, version);
}

#[test]
fn test_next_on_last_cell_without_creation_is_noop() {
    let session = Session::open(&[CellType::Code, CellType::Markdown]);
    let last = session.cells[1];
    session.bus.dispatch(FocusAction::FocusCell {
        content_ref: session.content_ref,
        id: last,
    });

    session.bus.dispatch(FocusAction::FocusNextCell {
        content_ref: session.content_ref,
        id: last,
        create_cell_if_undefined: false,
    });
    assert_eq!(session.len(), 2);
    assert_eq!(session.focused(), (Some(last), None));
}

#[test]
fn test_next_on_last_cell_with_creation_appends_and_focuses() {
    let session = Session::open(&[CellType::Markdown, CellType::Code]);
    let last = session.cells[1];

    session.bus.dispatch(FocusAction::FocusNextCell {
        content_ref: session.content_ref,
        id: last,
        create_cell_if_undefined: true,
    });

    assert_eq!(session.len(), 3);
    let created = session.order()[2];
    assert_eq!(session.focused().0, Some(created));

    let state = session.store.state();
    let model = notebook(&state, &session.content_ref).expect("open notebook");
    assert_eq!(model.notebook.cell_type(&created), Some(CellType::Code));
}

#[test]
fn test_unfocus_editor_keeps_cell_focus() {
    let session = Session::open(&[CellType::Code, CellType::Code]);
    let second = session.cells[1];
    session.bus.dispatch(FocusAction::FocusCell {
        content_ref: session.content_ref,
        id: second,
    });
    session.bus.dispatch(FocusAction::FocusCellEditor {
        content_ref: session.content_ref,
        id: Some(second),
    });
    assert_eq!(session.focused(), (Some(second), Some(second)));

    session.bus.dispatch(FocusAction::FocusCellEditor {
        content_ref: session.content_ref,
        id: None,
    });
    assert_eq!(session.focused(), (Some(second), None));
}

#[test]
fn test_editor_focus_requires_member_cell() {
    let session = Session::open(&[CellType::Code]);
    let stranger = CellId::new();

    session.bus.dispatch(FocusAction::FocusCellEditor {
        content_ref: session.content_ref,
        id: Some(stranger),
    });
    session.bus.dispatch(FocusAction::FocusNextCellEditor {
        content_ref: session.content_ref,
        id: stranger,
    });
    assert_eq!(session.focused(), (None, None));
}

#[test]
fn test_deleting_focused_cell_clears_editor_focus() {
    let session = Session::open(&[CellType::Code, CellType::Code, CellType::Code]);
    let middle = session.cells[1];
    session.bus.dispatch(FocusAction::FocusCell {
        content_ref: session.content_ref,
        id: middle,
    });
    session.bus.dispatch(FocusAction::FocusCellEditor {
        content_ref: session.content_ref,
        id: Some(middle),
    });

    session.bus.dispatch(DocumentAction::DeleteCell {
        content_ref: session.content_ref,
        id: middle,
    });

    let (cell, editor) = session.focused();
    assert_eq!(editor, None);
    assert_eq!(cell, Some(session.cells[2]));
    assert!(!cell_props(&session.store.state(), &session.content_ref, &middle).is_cell_focused);
}

#[test]
fn test_focus_in_other_document_is_isolated() {
    let first = Session::open(&[CellType::Code]);
    let other = ContentRef::new();

    first.bus.dispatch(FocusAction::FocusCell {
        content_ref: other,
        id: first.cells[0],
    });
    assert_eq!(first.focused(), (None, None));
}
