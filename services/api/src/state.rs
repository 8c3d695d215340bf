//! Application state shared across handlers

use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::repositories::UserRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub timezone: Tz,
}
