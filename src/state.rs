// src/state.rs

use std::sync::Arc;

use crate::config::Config;
use crate::session::AttemptStore;
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    /// Live quiz attempts, keyed by user. Not persisted.
    pub attempts: Arc<dyn AttemptStore>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AttemptStore> {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}
