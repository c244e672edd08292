//! The state shared by every request handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, pagination::PaginationConfig,
    timezone::get_local_offset,
};

/// Everything the handlers need: the database, the cookie key and the
/// household's settings.
///
/// Handlers take the slices of this they use through [FromRef], e.g. the
/// dashboard only sees the database connection and the timezone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signs and encrypts the session cookie.
    pub cookie_key: Key,

    /// How long a session lasts without any requests.
    pub cookie_duration: Duration,

    /// The household's timezone as a canonical name, e.g. "Pacific/Auckland".
    /// Decides what "today" and "this month" mean.
    pub local_timezone: String,

    /// Page sizes for the transactions list.
    pub pagination_config: PaginationConfig,

    /// The single SQLite connection, shared behind a mutex.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create the tables in `db_connection` if needed and build the state.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a
    /// known timezone, or an [Error::SqlError] if the tables could not be
    /// created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from `secret`.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, auth::DEFAULT_COOKIE_DURATION, pagination::PaginationConfig};

    use super::AppState;

    #[test]
    fn new_creates_tables() {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "secret",
            "Pacific/Auckland",
            PaginationConfig::default(),
        )
        .unwrap();

        assert_eq!(state.cookie_duration, DEFAULT_COOKIE_DURATION);
        assert_eq!(state.local_timezone, "Pacific/Auckland");
        let connection = state.db_connection.lock().unwrap();
        let tables: Vec<String> = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();
        for table in ["category", "transaction", "user"] {
            assert!(tables.iter().any(|name| name == table), "missing table {table}");
        }
    }

    #[test]
    fn new_rejects_unknown_timezone() {
        let result = AppState::new(
            Connection::open_in_memory().unwrap(),
            "secret",
            "Middle/Earth",
            PaginationConfig::default(),
        );

        assert!(matches!(result, Err(Error::InvalidTimezoneError(name)) if name == "Middle/Earth"));
    }
}
