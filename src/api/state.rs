//! Application state for the overtime engine API.

use std::sync::Arc;

use crate::config::OtmsConfig;
use crate::store::MemoryStore;
use crate::workflow::{ClaimService, Clock};

/// Shared application state.
///
/// Wraps the claim service every handler calls into.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ClaimService>,
}

impl AppState {
    /// Creates a new application state around a service.
    pub fn new(service: ClaimService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a state backed by an in-memory store seeded from `config`.
    pub fn from_config(config: &OtmsConfig, clock: Clock) -> Self {
        Self::new(ClaimService::new(
            Arc::new(MemoryStore::from_config(config)),
            clock,
        ))
    }

    /// Returns the claim service.
    pub fn service(&self) -> &ClaimService {
        &self.service
    }
}
