//! Ordered cell storage for notebook documents.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ids::CellId;
use crate::error::DocumentError;

/// Kind of content a cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Rendered markdown
    #[default]
    Markdown,
    /// Executable code
    Code,
    /// Raw passthrough text
    Raw,
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Markdown => write!(f, "markdown"),
            CellType::Code => write!(f, "code"),
            CellType::Raw => write!(f, "raw"),
        }
    }
}

/// A single unit of document content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub cell_type: CellType,
    pub source: String,
}

impl Cell {
    /// Create a cell with a fresh id
    pub fn new(cell_type: CellType, source: impl Into<String>) -> Self {
        Self {
            id: CellId::new(),
            cell_type,
            source: source.into(),
        }
    }

    /// Create an empty cell with a fresh id
    pub fn empty(cell_type: CellType) -> Self {
        Self::new(cell_type, "")
    }

    pub fn with_id(mut self, id: CellId) -> Self {
        self.id = id;
        self
    }
}

/// Read and append access to an ordered cell list.
///
/// This is the surface the focus coordinator needs from the document model:
/// the current order, a cell's type, and appending an empty cell.
pub trait DocumentModel {
    /// Cell ids in document order
    fn cell_order(&self) -> &[CellId];

    /// Type of the cell with this id, if present
    fn cell_type(&self, id: &CellId) -> Option<CellType>;

    /// Append an empty cell of the given type and return its id
    fn append_empty_cell(&mut self, cell_type: CellType) -> CellId;
}

/// Ordered collection of uniquely identified cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    cell_order: Vec<CellId>,
    cells: HashMap<CellId, Cell>,
}

impl Notebook {
    /// Create an empty notebook
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a notebook from cells in order, rejecting duplicate ids
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Result<Self, DocumentError> {
        let mut notebook = Self::new();
        for cell in cells {
            notebook.append_cell(cell)?;
        }
        Ok(notebook)
    }

    pub fn len(&self) -> usize {
        self.cell_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_order.is_empty()
    }

    pub fn contains(&self, id: &CellId) -> bool {
        self.cells.contains_key(id)
    }

    /// Position of a cell in document order
    pub fn index_of(&self, id: &CellId) -> Option<usize> {
        self.cell_order.iter().position(|candidate| candidate == id)
    }

    pub fn cell(&self, id: &CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Cells in document order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cell_order.iter().filter_map(|id| self.cells.get(id))
    }

    /// Append a cell at the end of the document
    pub fn append_cell(&mut self, cell: Cell) -> Result<CellId, DocumentError> {
        let index = self.cell_order.len();
        self.insert_cell_at(index, cell)
    }

    /// Insert a cell directly below `after`
    pub fn insert_cell_after(
        &mut self,
        after: &CellId,
        cell: Cell,
    ) -> Result<CellId, DocumentError> {
        let index = self
            .index_of(after)
            .ok_or(DocumentError::UnknownCell(*after))?;
        self.insert_cell_at(index + 1, cell)
    }

    fn insert_cell_at(&mut self, index: usize, cell: Cell) -> Result<CellId, DocumentError> {
        let id = cell.id;
        if self.cells.contains_key(&id) {
            return Err(DocumentError::DuplicateCell(id));
        }
        self.cell_order.insert(index.min(self.cell_order.len()), id);
        self.cells.insert(id, cell);
        Ok(id)
    }

    /// Remove a cell, returning it
    pub fn remove_cell(&mut self, id: &CellId) -> Result<Cell, DocumentError> {
        let cell = self
            .cells
            .remove(id)
            .ok_or(DocumentError::UnknownCell(*id))?;
        self.cell_order.retain(|candidate| candidate != id);
        Ok(cell)
    }

    /// Replace a cell's source text
    pub fn set_source(
        &mut self,
        id: &CellId,
        source: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let cell = self
            .cells
            .get_mut(id)
            .ok_or(DocumentError::UnknownCell(*id))?;
        cell.source = source.into();
        Ok(())
    }
}

impl DocumentModel for Notebook {
    fn cell_order(&self) -> &[CellId] {
        &self.cell_order
    }

    fn cell_type(&self, id: &CellId) -> Option<CellType> {
        self.cells.get(id).map(|cell| cell.cell_type)
    }

    fn append_empty_cell(&mut self, cell_type: CellType) -> CellId {
        let cell = Cell::empty(cell_type);
        let id = cell.id;
        self.cell_order.push(id);
        self.cells.insert(id, cell);
        id
    }
}
