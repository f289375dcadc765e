use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

/// Shared handles built once at startup and cloned into every router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<SupabaseClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let db = Arc::new(SupabaseClient::new(&config));
        Self {
            config: Arc::new(config),
            db,
        }
    }
}
