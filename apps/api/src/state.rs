use crate::config::Config;
use crate::sticker::jobs::JobRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Background generation runs, polled by job id.
    pub jobs: JobRegistry,
}
