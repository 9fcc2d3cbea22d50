// Application state for HTTP handlers
use crate::application::telemetry_repository::TelemetryRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn TelemetryRepository>,
}
