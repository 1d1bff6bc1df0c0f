//! Application wiring.
//!
//! A `Workbench` owns one action bus, the store attached to it, and the
//! standard epics. Views talk to it through `CellDispatcher`s and read
//! through `cell_props`.

use std::sync::Arc;

use cellkit_core::selectors;
use cellkit_core::{
    Action, ActionBus, AppState, CellDispatcher, CellId, CellProps, ConfigPersistence, ContentRef,
    DocumentPersistence, Store, SubscriptionId,
};
use cellkit_epics::{
    Epic, EpicContext, EpicError, EpicRegistry, EpicRuntime, EpicRuntimeConfig, LoadConfigEpic,
    SaveConfigEpic, SaveConfigOnChange, SaveDocumentEpic,
};

/// Bus, store and epics for one editing session
pub struct Workbench {
    bus: Arc<ActionBus>,
    store: Arc<Store>,
    /// The store's reducer subscription; `None` after `shutdown`
    store_subscription: Option<SubscriptionId>,
    registry: EpicRegistry,
    runtime_config: EpicRuntimeConfig,
    runtime: Option<EpicRuntime>,
}

impl Workbench {
    /// Wire a bus and store and register the standard epics
    pub fn new(
        config_persistence: Arc<dyn ConfigPersistence>,
        document_persistence: Arc<dyn DocumentPersistence>,
    ) -> Self {
        let bus = Arc::new(ActionBus::new());
        let store = Arc::new(Store::default());
        let store_subscription = Some(store.attach(&bus));

        let mut registry = EpicRegistry::new();
        registry
            .register(SaveConfigOnChange)
            .register(SaveConfigEpic::new(Arc::clone(&config_persistence)))
            .register(LoadConfigEpic::new(config_persistence))
            .register(SaveDocumentEpic::new(document_persistence));

        Self {
            bus,
            store,
            store_subscription,
            registry,
            runtime_config: EpicRuntimeConfig::default(),
            runtime: None,
        }
    }

    pub fn with_runtime_config(mut self, config: EpicRuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Add an epic; takes effect on the next `start`
    pub fn register(&mut self, epic: impl Epic) -> &mut Self {
        self.registry.register(epic);
        self
    }

    pub fn bus(&self) -> &Arc<ActionBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn state(&self) -> Arc<AppState> {
        self.store.state()
    }

    pub fn dispatch(&self, action: impl Into<Action>) {
        self.bus.dispatch(action);
    }

    /// Start the epic runtime
    ///
    /// Fails without side effects if an epic cannot be constructed. Calling
    /// it again while running does nothing. After `shutdown` the store is
    /// attached to the bus again; actions dispatched while shut down were
    /// never reduced.
    pub fn start(&mut self) -> Result<(), EpicError> {
        if self.is_running() {
            return Ok(());
        }
        let ctx = EpicContext::new(self.store.reader());
        let runtime = self.registry.start(&self.bus, &ctx, self.runtime_config)?;
        if self.store_subscription.is_none() {
            self.store_subscription = Some(self.store.attach(&self.bus));
            tracing::debug!("Store reattached to the bus");
        }
        tracing::info!("Workbench started with epics {:?}", self.registry.names());
        self.runtime = Some(runtime);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.runtime.as_ref().is_some_and(EpicRuntime::is_running)
    }

    /// Stop the epics and detach every subscriber from the bus
    pub async fn shutdown(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown().await;
        }
        let removed = self.bus.unsubscribe_all();
        self.store_subscription = None;
        tracing::info!("Workbench shut down, {} subscribers removed", removed);
    }

    /// Focus intents bound to one cell
    pub fn cell_dispatcher(&self, content_ref: ContentRef, id: CellId) -> CellDispatcher {
        CellDispatcher::new(Arc::clone(&self.bus), content_ref, id)
    }

    /// Derived view props for one cell
    pub fn cell_props(&self, content_ref: &ContentRef, id: &CellId) -> CellProps {
        selectors::cell_props(&self.store.state(), content_ref, id)
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("registry", &self.registry)
            .field("running", &self.is_running())
            .field("version", &self.store.state().version)
            .finish()
    }
}
