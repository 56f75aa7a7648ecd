//! Application state for dependency injection.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::repository::UserRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn UserRepository>,
    pub db: DatabaseConnection,
}

impl AppState {
    /// Create new app state.
    pub fn new(repo: Arc<dyn UserRepository>, db: DatabaseConnection) -> Self {
        Self { repo, db }
    }
}
