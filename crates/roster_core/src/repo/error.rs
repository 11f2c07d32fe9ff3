//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for roster persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Field or reference check failed; nothing was written.
    Validation(ValidationError),
    /// Storage failure, passed through untranslated.
    Db(DbError),
    /// No row matched the record's id.
    NotFound { entity: &'static str, id: i64 },
    /// Operation needs a saved record but `id` is `None`.
    NotPersisted(&'static str),
    /// `save` called on a record that already has a row.
    AlreadyPersisted { entity: &'static str, id: i64 },
    /// The shared record is currently borrowed by the caller.
    InstanceBorrowed(&'static str),
    /// The handle carries an id but is not the instance the repository
    /// tracks for it (e.g. a clone of a saved record).
    UntrackedInstance { entity: &'static str, id: i64 },
    /// Persisted row does not satisfy record invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NotPersisted(entity) => write!(f, "{entity} has not been saved"),
            Self::AlreadyPersisted { entity, id } => {
                write!(f, "{entity} is already saved with id {id}")
            }
            Self::InstanceBorrowed(entity) => {
                write!(f, "{entity} instance is borrowed elsewhere")
            }
            Self::UntrackedInstance { entity, id } => {
                write!(f, "{entity} {id} is not the tracked instance")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
