//! Shared application state handed to every handler.

use kasir_db::{Database, TransactionProcessor};

use crate::auth::JwtManager;
use crate::config::ServerConfig;

/// Cloneable per-request state. Everything inside is cheap to clone:
/// the database holds a pooled handle and the processor holds the same.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub processor: TransactionProcessor,
    pub jwt: JwtManager,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let processor = TransactionProcessor::new(db.clone());
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState {
            db,
            processor,
            jwt,
            config,
        }
    }
}
