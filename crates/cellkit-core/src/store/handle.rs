//! Single-writer store holding the current application state.

use parking_lot::RwLock;
use std::sync::Arc;

use super::reducer::reduce;
use super::state::{AppState, SessionToken};
use crate::action_bus::{Action, ActionBus, ActionFilter, SubscriptionId};
use crate::document::ContentRef;

/// Holds the current state and applies actions to it
///
/// Attach it to the bus before anything else so every other subscriber and
/// every epic observes an action after the state already reflects it.
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<Arc<AppState>>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: RwLock::new(Arc::new(initial)),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state.read())
    }

    /// Reduce one action into the state, returning the new version
    pub fn apply(&self, action: &Action) -> u64 {
        let mut current = self.state.write();
        let next = reduce(AppState::clone(&current), action);
        let version = next.version;
        if version != current.version {
            tracing::trace!("{} -> state v{}", action.tag(), version);
            *current = Arc::new(next);
        }
        version
    }

    /// Subscribe the reducer to `bus`
    pub fn attach(self: &Arc<Self>, bus: &ActionBus) -> SubscriptionId {
        let store = Arc::clone(self);
        bus.subscribe(ActionFilter::All, move |action| {
            store.apply(action);
        })
    }

    pub fn reader(self: &Arc<Self>) -> StateReader {
        StateReader {
            store: Arc::clone(self),
        }
    }
}

/// Read-only view of the store
#[derive(Debug, Clone)]
pub struct StateReader {
    store: Arc<Store>,
}

impl StateReader {
    pub fn state(&self) -> Arc<AppState> {
        self.store.state()
    }

    /// Token for the currently open session of `content_ref`
    pub fn session(&self, content_ref: &ContentRef) -> Option<SessionToken> {
        self.store.state().session(content_ref)
    }

    pub fn is_session_live(&self, token: &SessionToken) -> bool {
        self.store.state().is_session_live(token)
    }
}
