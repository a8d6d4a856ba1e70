use crate::config::Config;
use devspace_engine::EngineAdapter;
use devspace_orchestrator::WorkspaceController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<WorkspaceController>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, engine: EngineAdapter) -> Self {
        let mut controller =
            WorkspaceController::new(engine, config.allocator(), config.namer(), config.template());
        if config.serialize_per_identity {
            controller = controller.with_identity_locks();
        }

        Self::with_controller(config, controller)
    }

    /// Uses a pre-built controller, e.g. one with a custom port allocator.
    pub fn with_controller(config: Config, controller: WorkspaceController) -> Self {
        Self {
            controller: Arc::new(controller),
            config: Arc::new(config),
        }
    }
}
