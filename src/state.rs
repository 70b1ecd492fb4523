// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::activity_log::ActivityLogger;
use crate::services::metrics_manager::MetricsManager;
use crate::services::webhook::WebhookClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub webhook: WebhookClient,
    pub activity: ActivityLogger,
    pub metrics: MetricsManager,
    pub admin_key: Option<String>,
}

impl AppState {
    pub fn new(config: &Config, activity: ActivityLogger) -> Result<Self, reqwest::Error> {
        Ok(Self {
            webhook: WebhookClient::new(config.webhook_url.clone(), config.webhook_timeout)?,
            activity,
            metrics: MetricsManager::new(),
            admin_key: config.admin_key.clone(),
        })
    }
}
