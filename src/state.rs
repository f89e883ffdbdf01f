use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Store;
use crate::media::MediaHost;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn MediaHost>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, media: Arc<dyn MediaHost>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            media,
        }
    }
}
