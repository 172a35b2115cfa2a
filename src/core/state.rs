// Application state (AppState)

use crate::core::config::Config;
use crate::stores::user_store::UserStore;
use std::sync::Arc;

/// Shared application state
///
/// Built once at boot and handed to every handler through axum's `State`
/// extractor. Nothing in here is mutable; the store owns its own
/// concurrency through the pool's checkout discipline.
#[derive(Clone)]
pub struct AppState {
    /// Storage for users (the connection pool in production)
    pub store: Arc<dyn UserStore>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
