//! Document content model
//!
//! Cells, their stable identifiers and the ordered notebook that holds them.
//! Document order defines "above" and "below" for focus navigation.

mod ids;
mod notebook;

pub use ids::{CellId, ContentRef};
pub use notebook::{Cell, CellType, DocumentModel, Notebook};
