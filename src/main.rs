use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::StreamExt;
use serde_json::json;

use cellkit::{
    init_logging, Action, Cell, CellType, ConfigAction, DocumentAction, DocumentKind,
    FileConfigPersistence, MemoryConfigPersistence, MemoryDocumentPersistence, Workbench,
    BUILD_DATE, VERSION,
};
use cellkit_core::{ActionStream, ConfigPersistence};

const ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait for the first action accepted by `matches`
async fn await_action<F>(stream: &mut ActionStream, matches: F) -> anyhow::Result<Action>
where
    F: Fn(&Action) -> bool,
{
    let found = tokio::time::timeout(ROUND_TRIP_TIMEOUT, async {
        while let Some(action) = stream.next().await {
            if matches(&action) {
                return Some(action);
            }
        }
        None
    })
    .await
    .context("timed out waiting for action")?;
    found.context("action bus closed")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("cellkit {} (built {})", VERSION, BUILD_DATE);

    // An optional argument names a .json or .toml options file.
    let config_persistence: Arc<dyn ConfigPersistence> = match std::env::args().nth(1) {
        Some(path) => Arc::new(FileConfigPersistence::new(path)?),
        None => Arc::new(MemoryConfigPersistence::new()),
    };
    let documents = Arc::new(MemoryDocumentPersistence::new());

    let mut workbench = Workbench::new(config_persistence, documents.clone());
    workbench.start()?;
    let mut actions = workbench.bus().action_stream();

    workbench.dispatch(ConfigAction::LoadConfig);
    let loaded = await_action(&mut actions, |action| {
        matches!(
            action,
            Action::Config(ConfigAction::MergeConfig { .. } | ConfigAction::LoadConfigFailed { .. })
        )
    })
    .await?;
    tracing::info!("Config load finished with {}", loaded.tag());

    let first = Cell::new(CellType::Code, "print('hello')");
    let second = Cell::new(CellType::Markdown, "# Notes");
    let content_ref = cellkit::ContentRef::new();
    workbench.dispatch(DocumentAction::OpenDocument {
        content_ref,
        kind: DocumentKind::Notebook,
        cells: vec![first.clone(), second.clone()],
    });

    let dispatcher = workbench.cell_dispatcher(content_ref, first.id);
    dispatcher.focus_editor();
    dispatcher.focus_below_cell();
    tracing::info!("Focused second cell: {:?}", workbench.cell_props(&content_ref, &second.id));

    workbench
        .cell_dispatcher(content_ref, second.id)
        .focus_below_cell();
    let state = workbench.state();
    if let Some(model) = cellkit_core::selectors::notebook(&state, &content_ref) {
        tracing::info!(
            "Notebook has {} cells, focus {:?}",
            model.notebook.len(),
            model.focus
        );
    }

    workbench.dispatch(ConfigAction::SetConfig {
        key: "markdownOptions".to_string(),
        value: json!({ "breaks": true }),
    });
    let saved = await_action(&mut actions, |action| {
        matches!(
            action,
            Action::Config(ConfigAction::DoneSavingConfig | ConfigAction::SaveConfigFailed { .. })
        )
    })
    .await?;
    tracing::info!(
        "Config save finished with {}; markdown options {:?}",
        saved.tag(),
        workbench.cell_props(&content_ref, &second.id).markdown_options
    );

    workbench.dispatch(DocumentAction::Save { content_ref });
    let outcome = await_action(&mut actions, |action| {
        matches!(
            action,
            Action::Document(
                DocumentAction::SaveFulfilled { .. } | DocumentAction::SaveFailed { .. }
            )
        )
    })
    .await?;
    tracing::info!(
        "Document save finished with {} ({} saves stored)",
        outcome.tag(),
        documents.save_count()
    );

    workbench.dispatch(DocumentAction::CloseDocument { content_ref });
    workbench.shutdown().await;
    Ok(())
}
