use std::sync::Arc;

use waypoint_auth::AuthGate;
use waypoint_registry::Registry;

#[derive(Clone)]
pub struct AppState {
    registry: Arc<dyn Registry>,
    gate: Arc<dyn AuthGate>,
}

impl AppState {
    pub fn new(registry: Arc<dyn Registry>, gate: Arc<dyn AuthGate>) -> Self {
        Self { registry, gate }
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    pub fn gate(&self) -> &dyn AuthGate {
        self.gate.as_ref()
    }
}
