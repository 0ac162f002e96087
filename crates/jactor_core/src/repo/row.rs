//! Shared row mapping for the identity and audit columns.

use crate::model::persistent::{Actor, EpochMillis, Persistable, Persistent, RecordId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Row;
use uuid::Uuid;

/// Column list selected by every repository ahead of its domain columns.
pub(crate) const AUDIT_SELECT: &str =
    "id, created_by, time_of_creation, modified_by, time_of_modification";

/// Audit values bound by insert statements.
pub(crate) struct InsertAudit<'a> {
    pub created_by: &'a str,
    pub time_of_creation: EpochMillis,
    pub modified_by: &'a str,
    pub time_of_modification: EpochMillis,
}

/// Audit values bound by update statements, keyed by the record id.
pub(crate) struct UpdateAudit<'a> {
    entity: &'static str,
    record_id: RecordId,
    pub id: String,
    pub modified_by: &'a str,
    pub time_of_modification: EpochMillis,
}

impl UpdateAudit<'_> {
    /// Maps "zero rows affected" to [`RepoError::NotFound`].
    pub(crate) fn require_row(&self, changed: usize) -> RepoResult<()> {
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: self.entity,
                id: self.record_id,
            });
        }
        Ok(())
    }
}

pub(crate) fn insert_audit<T: Persistable>(record: &T) -> RepoResult<InsertAudit<'_>> {
    let persistent = record.persistent();
    if let Some(id) = persistent.id() {
        return Err(RepoError::InvalidData(format!(
            "{} {id} is already persisted; insert requires an unpersisted record",
            T::ENTITY
        )));
    }
    Ok(InsertAudit {
        created_by: required(persistent.created_by(), T::ENTITY, "created_by")?.as_str(),
        time_of_creation: required(persistent.time_of_creation(), T::ENTITY, "time_of_creation")?,
        modified_by: required(persistent.modified_by(), T::ENTITY, "modified_by")?.as_str(),
        time_of_modification: required(
            persistent.time_of_modification(),
            T::ENTITY,
            "time_of_modification",
        )?,
    })
}

pub(crate) fn update_audit<T: Persistable>(record: &T) -> RepoResult<UpdateAudit<'_>> {
    let persistent = record.persistent();
    let id = persistent.id().ok_or_else(|| {
        RepoError::InvalidData(format!(
            "{} has no id; update requires a persisted record",
            T::ENTITY
        ))
    })?;
    Ok(UpdateAudit {
        entity: T::ENTITY,
        record_id: id,
        id: id.to_string(),
        modified_by: required(persistent.modified_by(), T::ENTITY, "modified_by")?.as_str(),
        time_of_modification: required(
            persistent.time_of_modification(),
            T::ENTITY,
            "time_of_modification",
        )?,
    })
}

fn required<V>(value: Option<V>, entity: &str, field: &str) -> RepoResult<V> {
    value.ok_or_else(|| RepoError::InvalidData(format!("{entity} is missing `{field}`")))
}

/// Reads the columns listed in [`AUDIT_SELECT`].
pub(crate) fn read_persistent(row: &Row<'_>, table: &str) -> RepoResult<Persistent> {
    let id = read_id(row, "id", table)?;
    let created_by: String = row.get("created_by")?;
    let time_of_creation: EpochMillis = row.get("time_of_creation")?;
    let modified_by: String = row.get("modified_by")?;
    let time_of_modification: EpochMillis = row.get("time_of_modification")?;

    Ok(Persistent::restored(
        id,
        Actor::new(created_by),
        time_of_creation,
        Actor::new(modified_by),
        time_of_modification,
    ))
}

pub(crate) fn read_id(row: &Row<'_>, column: &str, table: &str) -> RepoResult<RecordId> {
    let text: String = row.get(column)?;
    parse_id(&text, column, table)
}

pub(crate) fn read_optional_id(
    row: &Row<'_>,
    column: &str,
    table: &str,
) -> RepoResult<Option<RecordId>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse_id(&text, column, table).map(Some),
        None => Ok(None),
    }
}

fn parse_id(text: &str, column: &str, table: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

pub(crate) fn id_param(id: Option<RecordId>) -> Option<String> {
    id.map(|id| id.to_string())
}
