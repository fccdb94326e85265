// Application state module
// Read-only configuration plus the shutdown signal shared by connections

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,

    /// Notified once when the server should stop accepting connections
    pub shutdown_signal: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            shutdown_signal: Arc::new(Notify::new()),
        }
    }
}
