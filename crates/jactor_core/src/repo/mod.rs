//! Repository contracts, the upsert strategy and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage collaborator each aggregate is saved through.
//! - Decide insert versus update from identity state alone.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths call the aggregate's `validate()` before SQL mutations.
//! - Update paths never rewrite `id`, `created_by` or `time_of_creation`.
//! - Storage failures are returned unchanged; nothing is retried.
//! - No version column exists, so concurrent updates of one row are
//!   last-write-wins.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::persistent::{Actor, EpochMillis, Persistable, RecordId};
use crate::model::validation::ValidationError;
use log::{debug, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod address_repo;
pub mod blog_repo;
pub mod guest_book_repo;
pub mod person_repo;
pub mod relations;
mod row;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for aggregate persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Aggregate rejected before reaching storage.
    Validation(ValidationError),
    /// Underlying SQLite error, including uniqueness and foreign-key
    /// violations.
    Db(DbError),
    /// An update targeted an id with no stored row.
    NotFound { entity: &'static str, id: RecordId },
    /// A stored row cannot be converted back into an aggregate.
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
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

/// Storage collaborator for one aggregate type.
pub trait RecordStore<T: Persistable> {
    /// Loads one row; `Ok(None)` when absent.
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<T>>;

    /// Writes every column of an unpersisted record and returns the
    /// storage-generated id.
    fn insert(&self, record: &T) -> RepoResult<RecordId>;

    /// Writes the mutable columns of a persisted record.
    ///
    /// Returns [`RepoError::NotFound`] when no row has the record's id.
    fn update(&self, record: &T) -> RepoResult<()>;
}

/// Storage collaborator for aggregates that are children of another one.
pub trait ChildRecordStore<T: Persistable>: RecordStore<T> {
    /// All children of `parent_id`, empty when there are none.
    fn fetch_many(&self, parent_id: RecordId) -> RepoResult<Vec<T>>;
}

/// Inserts an unpersisted record or updates a persisted one.
///
/// # Contract
/// - Unpersisted: missing creation metadata is set to `actor`/`now`,
///   derived fields are filled, every column is inserted and the generated
///   id is written back.
/// - Persisted: only mutable columns are updated; identity is unchanged.
/// - Modification stamping is the caller's job and must happen first.
///
/// # Panics
/// - When an unpersisted record carries only half of its creation metadata.
pub fn upsert<T, S>(store: &S, mut record: T, actor: &Actor, now: EpochMillis) -> RepoResult<T>
where
    T: Persistable,
    S: RecordStore<T> + ?Sized,
{
    match record.id() {
        None => {
            let persistent = record.persistent();
            let has_creator = persistent.created_by().is_some();
            assert_eq!(
                has_creator,
                persistent.time_of_creation().is_some(),
                "creation metadata of an unsaved {} must be complete or absent",
                T::ENTITY
            );
            if !has_creator {
                record.persistent_mut().stamp_created(actor, now);
            }
            record.prepare_insert();

            let id = store.insert(&record).inspect_err(|err| {
                warn!(
                    "event=record_save module=repo status=error entity={} op=insert error={err}",
                    T::ENTITY
                );
            })?;
            record.persistent_mut().assign_id(id);
            debug!(
                "event=record_save module=repo status=ok entity={} op=insert id={id}",
                T::ENTITY
            );
            Ok(record)
        }
        Some(id) => {
            store.update(&record).inspect_err(|err| {
                warn!(
                    "event=record_save module=repo status=error entity={} op=update id={id} error={err}",
                    T::ENTITY
                );
            })?;
            debug!(
                "event=record_save module=repo status=ok entity={} op=update id={id}",
                T::ENTITY
            );
            Ok(record)
        }
    }
}

/// Rejects connections that were not opened through `db::open_*`.
pub(crate) fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }

    Ok(())
}
