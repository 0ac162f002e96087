//! SQLite bootstrap for the jactor aggregate tables.
//!
//! # Responsibility
//! - Open file, in-memory or configured connections with the pragmas the
//!   repositories rely on.
//! - Create and evolve the `t_address`, `t_person`, `t_user`, `t_blog`,
//!   `t_blog_entry`, `t_guest_book` and `t_guest_book_entry` tables.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A database written by a newer schema is refused, never downgraded.
//! - Repositories only accept connections opened here.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_from_config};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failure below the repositories.
#[derive(Debug)]
pub enum DbError {
    /// Driver error, including `UNIQUE` and `FOREIGN KEY` violations.
    Sqlite(rusqlite::Error),
    /// The file carries a schema this binary does not know.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Whether a write was refused by a table constraint, such as a taken
    /// username or a dangling parent id.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "jactor schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
