use std::sync::Arc;

use rollcall_db::DbPool;

use crate::config::ServerConfig;

/// Handed to every handler through `State<AppState>`; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
