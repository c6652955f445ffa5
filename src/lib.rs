pub mod api;
pub mod config;
pub mod db;
pub mod session;

pub use db::DbPool;

use config::Config;
use session::SessionStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            config,
            db,
            sessions,
        }
    }
}
