//! Epic registry and combinator.
//!
//! Every registered epic is attached to its own subscription of the same
//! upstream action stream, and their outputs are interleaved into one
//! merged stream. Each epic's contribution is isolated: error items are
//! logged and dropped, and a panic ends only that epic's contribution
//! (optionally restarting it).

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use cellkit_core::action_bus::panic_message;
use cellkit_core::ActionStream;

use crate::epic::{Epic, EpicContext, EpicOutput};
use crate::error::EpicError;

/// Produces a fresh subscription to the upstream action stream
pub type UpstreamFactory = Arc<dyn Fn() -> ActionStream + Send + Sync>;

/// What to do with an epic whose output panicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    /// Drop the epic's contribution.
    #[default]
    Never,
    /// Re-run the epic on a fresh subscription, at most `max_restarts` times.
    OnFailure { max_restarts: u32 },
}

impl RestartPolicy {
    fn budget(&self) -> u32 {
        match self {
            RestartPolicy::Never => 0,
            RestartPolicy::OnFailure { max_restarts } => *max_restarts,
        }
    }
}

/// Ordered collection of epics
#[derive(Default)]
pub struct EpicRegistry {
    epics: Vec<Arc<dyn Epic>>,
}

impl EpicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an epic
    pub fn register<E: Epic>(&mut self, epic: E) -> &mut Self {
        self.register_shared(Arc::new(epic))
    }

    /// Add an epic that is shared elsewhere
    pub fn register_shared(&mut self, epic: Arc<dyn Epic>) -> &mut Self {
        tracing::debug!("Epic '{}' registered", epic.name());
        self.epics.push(epic);
        self
    }

    pub fn len(&self) -> usize {
        self.epics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epics.is_empty()
    }

    /// Names of registered epics in registration order
    pub fn names(&self) -> Vec<&str> {
        self.epics.iter().map(|epic| epic.name()).collect()
    }

    /// Construct every epic and merge their isolated outputs
    ///
    /// Each epic gets its own subscription from `upstream`, taken before the
    /// epic is constructed. If any epic fails to construct, the error is
    /// returned and no stream is produced.
    pub fn combine(
        &self,
        upstream: UpstreamFactory,
        ctx: &EpicContext,
        policy: RestartPolicy,
    ) -> Result<ActionStream, EpicError> {
        let mut contributions = Vec::with_capacity(self.epics.len());
        for epic in &self.epics {
            let output = construct(epic.as_ref(), upstream(), ctx).inspect_err(|err| {
                tracing::error!("{}", err);
            })?;
            contributions.push(isolate(Contribution {
                epic: Arc::clone(epic),
                upstream: Arc::clone(&upstream),
                ctx: ctx.clone(),
                output,
                restarts_left: policy.budget(),
            }));
        }

        tracing::debug!("Combined {} epics", contributions.len());
        Ok(stream::select_all(contributions).boxed())
    }
}

impl std::fmt::Debug for EpicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpicRegistry")
            .field("epics", &self.names())
            .finish()
    }
}

/// Run an epic, turning any failure into a construction error
fn construct(
    epic: &dyn Epic,
    actions: ActionStream,
    ctx: &EpicContext,
) -> Result<EpicOutput, EpicError> {
    match panic::catch_unwind(AssertUnwindSafe(|| epic.run(actions, ctx))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) if err.is_fatal() => Err(err),
        Ok(Err(err)) => Err(EpicError::construction(epic.name(), err.to_string())),
        Err(payload) => Err(EpicError::construction(
            epic.name(),
            format!("panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

struct Contribution {
    epic: Arc<dyn Epic>,
    upstream: UpstreamFactory,
    ctx: EpicContext,
    output: EpicOutput,
    restarts_left: u32,
}

impl Contribution {
    fn restart(&mut self) -> bool {
        if self.restarts_left == 0 {
            return false;
        }
        self.restarts_left -= 1;

        match construct(self.epic.as_ref(), (self.upstream)(), &self.ctx) {
            Ok(output) => {
                tracing::info!(
                    "Epic '{}' restarted ({} restarts left)",
                    self.epic.name(),
                    self.restarts_left
                );
                self.output = output;
                true
            }
            Err(err) => {
                tracing::error!("Epic '{}' could not restart: {}", self.epic.name(), err);
                false
            }
        }
    }
}

fn isolate(contribution: Contribution) -> ActionStream {
    stream::unfold(contribution, |mut contribution| async move {
        loop {
            let polled = AssertUnwindSafe(contribution.output.next())
                .catch_unwind()
                .await;

            match polled {
                Ok(Some(Ok(action))) => return Some((action, contribution)),
                Ok(Some(Err(err))) => {
                    tracing::warn!(
                        "Dropped output of epic '{}': {}",
                        contribution.epic.name(),
                        err
                    );
                }
                Ok(None) => {
                    tracing::debug!("Epic '{}' completed", contribution.epic.name());
                    return None;
                }
                Err(payload) => {
                    tracing::error!(
                        "Epic '{}' panicked: {}",
                        contribution.epic.name(),
                        panic_message(payload.as_ref())
                    );
                    if !contribution.restart() {
                        return None;
                    }
                }
            }
        }
    })
    .boxed()
}
