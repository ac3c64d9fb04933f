//! Shared application state handed to every handler.

use bazaar_db::Database;

/// Application state: the database handle (crucially, constructed once at
/// startup and injected, never reached through a global).
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
