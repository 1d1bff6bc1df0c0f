//! Document save epic.

use futures::future;
use futures::StreamExt;
use std::sync::Arc;

use cellkit_core::selectors;
use cellkit_core::{Action, ActionStream, ContentRef, DocumentAction, DocumentPersistence};

use crate::epic::{Epic, EpicContext, EpicOutput};
use crate::error::EpicError;

/// Persists a notebook on `SAVE` and reports the outcome
///
/// The result is keyed to the session that requested the save. If that
/// session was closed while the write was in flight, the result is dropped.
pub struct SaveDocumentEpic {
    persistence: Arc<dyn DocumentPersistence>,
}

impl SaveDocumentEpic {
    pub fn new(persistence: Arc<dyn DocumentPersistence>) -> Self {
        Self { persistence }
    }
}

impl Epic for SaveDocumentEpic {
    fn name(&self) -> &str {
        "save_document"
    }

    fn run(&self, actions: ActionStream, ctx: &EpicContext) -> Result<EpicOutput, EpicError> {
        let persistence = Arc::clone(&self.persistence);
        let ctx = ctx.clone();

        Ok(actions
            .filter_map(|action| {
                future::ready(match action {
                    Action::Document(DocumentAction::Save { content_ref }) => Some(content_ref),
                    _ => None,
                })
            })
            .then(move |content_ref| {
                let persistence = Arc::clone(&persistence);
                let ctx = ctx.clone();
                async move {
                    let Some(session) = ctx.session(&content_ref) else {
                        tracing::debug!("Save requested for closed document {}", content_ref);
                        return None;
                    };

                    let result = save_notebook(persistence.as_ref(), &ctx, content_ref).await;

                    if !ctx.is_session_live(&session) {
                        tracing::debug!(
                            "Document {} closed while saving, result dropped",
                            content_ref
                        );
                        return None;
                    }

                    Some(match result {
                        Ok(()) => DocumentAction::SaveFulfilled { content_ref },
                        Err(err) if err.is_persistence_error() => {
                            tracing::warn!("Failed to save {}: {}", content_ref, err);
                            DocumentAction::SaveFailed {
                                content_ref,
                                error: err.to_string(),
                            }
                        }
                        Err(err) => {
                            tracing::warn!("Cannot save {}: {}", content_ref, err);
                            DocumentAction::SaveFailed {
                                content_ref,
                                error: err.to_string(),
                            }
                        }
                    })
                }
            })
            .filter_map(|outcome| future::ready(outcome.map(|action| Ok(Action::from(action)))))
            .boxed())
    }
}

/// Snapshot the notebook and hand it to persistence
async fn save_notebook(
    persistence: &dyn DocumentPersistence,
    ctx: &EpicContext,
    content_ref: ContentRef,
) -> cellkit_core::Result<()> {
    let notebook = selectors::notebook_snapshot(&ctx.state().state(), &content_ref)?;
    persistence.save(&content_ref, &notebook).await?;
    Ok(())
}
