use std::sync::Arc;

use magnetwatch_core::{MonitorOrchestrator, MonitorScheduler, MonitorStore, ResultDispatcher};

/// Shared application state
pub struct AppState {
    store: Arc<dyn MonitorStore>,
    orchestrator: Arc<MonitorOrchestrator>,
    dispatcher: Option<Arc<ResultDispatcher>>,
    scheduler: Arc<MonitorScheduler>,
}

impl AppState {
    /// The store is the one the orchestrator runs against.
    pub fn new(
        orchestrator: Arc<MonitorOrchestrator>,
        dispatcher: Option<Arc<ResultDispatcher>>,
        scheduler: Arc<MonitorScheduler>,
    ) -> Self {
        Self {
            store: Arc::clone(orchestrator.store()),
            orchestrator,
            dispatcher,
            scheduler,
        }
    }

    pub fn store(&self) -> &Arc<dyn MonitorStore> {
        &self.store
    }

    pub fn orchestrator(&self) -> &MonitorOrchestrator {
        self.orchestrator.as_ref()
    }

    pub fn dispatcher(&self) -> Option<&ResultDispatcher> {
        self.dispatcher.as_deref()
    }

    pub fn scheduler(&self) -> &MonitorScheduler {
        self.scheduler.as_ref()
    }
}
