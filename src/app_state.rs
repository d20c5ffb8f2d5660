use std::sync::Arc;

use crate::services::lookup::VehicleLookup;
use crate::services::rate_limit::CooldownGate;

/// Shared application state passed to all route handlers.
///
/// The lookup is held behind the `VehicleLookup` trait so tests can swap the
/// portal client for a stub.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<CooldownGate>,
    pub lookup: Arc<dyn VehicleLookup>,
}

impl AppState {
    pub fn new(gate: CooldownGate, lookup: Arc<dyn VehicleLookup>) -> Self {
        Self {
            gate: Arc::new(gate),
            lookup,
        }
    }
}
