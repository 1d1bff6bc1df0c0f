//! # Cellkit Epics
//!
//! Side effects for Cellkit, expressed as epics: transformations from the
//! action stream to derived actions. Provides the epic registry and
//! combinator, the runtime that feeds merged output back onto the bus, and
//! the standard configuration and document epics.

pub mod config;
pub mod document;
pub mod epic;
pub mod error;
pub mod registry;
pub mod runtime;

pub use config::{save_config_on_change, LoadConfigEpic, SaveConfigEpic, SaveConfigOnChange};
pub use document::SaveDocumentEpic;
pub use epic::{epic_fn, Epic, EpicContext, EpicOutput, FnEpic};
pub use error::EpicError;
pub use registry::{EpicRegistry, RestartPolicy, UpstreamFactory};
pub use runtime::{EpicRuntime, EpicRuntimeConfig};
