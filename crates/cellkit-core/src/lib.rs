//! # Cellkit Core
//!
//! Core types and state logic for cell-based document editors.
//! Provides the action vocabulary and bus, the document model, focus
//! coordination, the store and its read-side selectors.

pub mod action_bus;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod focus;
pub mod persistence;
pub mod selectors;
pub mod store;

pub use action_bus::{
    Action, ActionBus, ActionBusConfig, ActionCategory, ActionFilter, ActionStream, ConfigAction,
    DocumentAction, DocumentKind, FocusAction, SubscriptionId,
};

pub use config::Config;
pub use dispatch::{CellDispatcher, FocusMove};
pub use document::{Cell, CellId, CellType, ContentRef, DocumentModel, Notebook};
pub use error::{BusError, DocumentError, Error, PersistenceError, Result};
pub use focus::FocusState;
pub use persistence::{ConfigPersistence, DocumentPersistence};
pub use selectors::CellProps;
pub use store::{AppState, SessionToken, StateReader, Store};
