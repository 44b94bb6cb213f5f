// Application state module
// Read-only state shared by every connection

use super::types::Config;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Whether one access log line is written per request
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
