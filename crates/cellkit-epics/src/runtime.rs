//! Epic runtime.
//!
//! Runs the merged epic output on a spawned worker and re-dispatches every
//! derived action onto the bus it came from.

use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cellkit_core::ActionBus;

use crate::epic::EpicContext;
use crate::error::EpicError;
use crate::registry::{EpicRegistry, RestartPolicy, UpstreamFactory};

/// Runtime configuration for the combinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpicRuntimeConfig {
    /// Applied to each epic whose output panics.
    pub restart_policy: RestartPolicy,
}

/// Handle to a running set of epics
#[derive(Debug)]
pub struct EpicRuntime {
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl EpicRegistry {
    /// Attach every epic to `bus` and start forwarding their output
    ///
    /// Subscriptions are taken before this returns, so actions dispatched
    /// afterwards are observed. Must be called from within a tokio runtime.
    pub fn start(
        &self,
        bus: &Arc<ActionBus>,
        ctx: &EpicContext,
        config: EpicRuntimeConfig,
    ) -> Result<EpicRuntime, EpicError> {
        let source = Arc::clone(bus);
        let upstream: UpstreamFactory = Arc::new(move || source.action_stream());
        let mut merged = self.combine(upstream, ctx, config.restart_policy)?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let bus = Arc::clone(bus);
        let epic_count = self.len();

        let worker = tokio::spawn(async move {
            tracing::debug!("Epic runtime started with {} epics", epic_count);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    next = merged.next() => match next {
                        Some(action) => {
                            tracing::trace!("Epic output {}", action.tag());
                            bus.dispatch(action);
                        }
                        None => break,
                    },
                }
            }
            tracing::debug!("Epic runtime stopped");
        });

        Ok(EpicRuntime {
            cancel,
            worker: Some(worker),
        })
    }
}

impl EpicRuntime {
    /// Whether the worker is still forwarding actions
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Stop forwarding and wait for the worker to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                tracing::warn!("Epic runtime worker ended abnormally: {}", err);
            }
        }
    }
}

impl Drop for EpicRuntime {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
