//! Application state shared across handlers

use crate::inference::InferenceService;
use std::sync::Arc;

use super::ServerConfig;

/// Read-only state: nothing here changes after startup
pub struct AppState {
    pub config: ServerConfig,
    pub service: Arc<InferenceService>,
}

impl AppState {
    pub fn new(config: ServerConfig, service: Arc<InferenceService>) -> Self {
        Self { config, service }
    }
}
