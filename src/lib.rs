//! # Cellkit
//!
//! Side-effect coordination and focus management for cell-based document
//! editors.
//!
//! ## Architecture
//!
//! Cellkit is organized as a workspace with multiple crates:
//!
//! 1. **cellkit-core** - Actions, action bus, document model, focus, store, selectors
//! 2. **cellkit-epics** - Epic registry, combinator, runtime and standard epics
//! 3. **cellkit-settings** - Config and document persistence adapters
//! 4. **cellkit** - Workbench wiring and the headless binary

mod workbench;

pub use workbench::Workbench;

pub use cellkit_core::{
    Action, ActionBus, ActionCategory, ActionFilter, AppState, Cell, CellDispatcher, CellId,
    CellProps, CellType, Config, ConfigAction, ContentRef, DocumentAction, DocumentKind,
    FocusAction, FocusMove, FocusState, Notebook, Store,
};

pub use cellkit_epics::{
    Epic, EpicContext, EpicError, EpicRegistry, EpicRuntimeConfig, RestartPolicy,
};

pub use cellkit_settings::{
    FileConfigPersistence, MemoryConfigPersistence, MemoryDocumentPersistence, SettingsManager,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
