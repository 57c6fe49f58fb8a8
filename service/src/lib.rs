use config::Config;
use std::sync::Arc;

pub mod config;
pub mod logging;

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be shared across tasks
#[derive(Clone)]
pub struct AppState {
    pub http_client: Arc<reqwest::Client>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, http_client: &Arc<reqwest::Client>) -> Self {
        Self {
            http_client: Arc::clone(http_client),
            config: app_config,
        }
    }

    pub fn http_client_ref(&self) -> &reqwest::Client {
        self.http_client.as_ref()
    }
}
