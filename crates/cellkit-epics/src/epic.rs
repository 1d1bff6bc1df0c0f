//! The epic abstraction.
//!
//! An epic maps the stream of all actions to a stream of derived actions.
//! It never touches state directly: its only effect is emitting actions,
//! possibly after awaiting an external call.

use futures::stream::BoxStream;
use std::sync::Arc;

use cellkit_core::{Action, ActionStream, ContentRef, SessionToken, StateReader, Store};

use crate::error::EpicError;

/// Derived actions produced by an epic
///
/// An `Err` item is a runtime failure of one emission: it is logged and
/// dropped, and the epic keeps running.
pub type EpicOutput = BoxStream<'static, Result<Action, EpicError>>;

/// Transformation from the action stream to derived actions
pub trait Epic: Send + Sync + 'static {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Attach to `actions` and return the derived stream
    ///
    /// Called once at startup, and again on restart. An `Err` here is a
    /// configuration error and aborts startup.
    fn run(&self, actions: ActionStream, ctx: &EpicContext) -> Result<EpicOutput, EpicError>;
}

/// What an epic may read while running
#[derive(Debug, Clone)]
pub struct EpicContext {
    state: StateReader,
}

impl EpicContext {
    pub fn new(state: StateReader) -> Self {
        Self { state }
    }

    /// Context over an empty store, for epics exercised without one
    pub fn detached() -> Self {
        Self::new(Arc::new(Store::default()).reader())
    }

    pub fn state(&self) -> &StateReader {
        &self.state
    }

    /// Token for the currently open session of `content_ref`
    pub fn session(&self, content_ref: &ContentRef) -> Option<SessionToken> {
        self.state.session(content_ref)
    }

    /// Whether a result keyed to `token` may still be written back
    pub fn is_session_live(&self, token: &SessionToken) -> bool {
        self.state.is_session_live(token)
    }
}

/// Epic built from a closure
pub struct FnEpic<F> {
    name: String,
    run: F,
}

/// Wrap a closure as a named epic
pub fn epic_fn<F>(name: impl Into<String>, run: F) -> FnEpic<F>
where
    F: Fn(ActionStream, &EpicContext) -> Result<EpicOutput, EpicError> + Send + Sync + 'static,
{
    FnEpic {
        name: name.into(),
        run,
    }
}

impl<F> Epic for FnEpic<F>
where
    F: Fn(ActionStream, &EpicContext) -> Result<EpicOutput, EpicError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, actions: ActionStream, ctx: &EpicContext) -> Result<EpicOutput, EpicError> {
        (self.run)(actions, ctx)
    }
}
