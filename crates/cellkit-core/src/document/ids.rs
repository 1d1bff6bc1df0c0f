//! Stable identifiers for cells and open documents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a cell, unique within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(Uuid);

impl CellId {
    /// Create a new unique cell ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell({})", &self.0.to_string()[..8])
    }
}

/// Opaque reference scoping state to one open document/session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentRef(Uuid);

impl ContentRef {
    /// Create a new unique content reference
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ContentRef {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Content({})", &self.0.to_string()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(CellId::new(), CellId::new());
        assert_ne!(ContentRef::new(), ContentRef::new());
    }

    #[test]
    fn test_display_is_shortened() {
        let uuid = Uuid::parse_str("0123abcd-0000-4000-8000-000000000000").expect("valid uuid");
        assert_eq!(CellId::from_uuid(uuid).to_string(), "Cell(0123abcd)");
        assert_eq!(ContentRef::from_uuid(uuid).to_string(), "Content(0123abcd)");
    }
}
