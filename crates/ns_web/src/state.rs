use std::sync::Arc;
use ns_pipeline::Orchestrator;

pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}
