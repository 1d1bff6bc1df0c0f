//! Application state, the reducer that evolves it and the store that holds
//! the current value.

mod handle;
mod reducer;
mod state;

pub use handle::{StateReader, Store};
pub use reducer::reduce;
pub use state::{AppState, ContentModel, DocumentState, NotebookModel, SessionToken};
