//! SQLite storage bootstrap and table setup entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for roster core.
//! - Create and drop the `departments`/`employees`/`reviews` tables.
//!
//! # Invariants
//! - Every mutating statement runs in autocommit mode; core never opens
//!   multi-statement transactions.
//! - Table DDL is idempotent (`IF NOT EXISTS` / `IF EXISTS`).

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_db_in_memory_with, open_db_with};

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection-level settings applied right after open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbOptions {
    /// Enables `PRAGMA foreign_keys`. Off by default, matching stock SQLite,
    /// so deleting an employee leaves its reviews behind instead of failing.
    pub foreign_keys: bool,
    /// How long a statement waits on a locked database file.
    pub busy_timeout: Duration,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            foreign_keys: false,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
