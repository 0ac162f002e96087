//! Identity and audit contract shared by every persisted aggregate.
//!
//! # Responsibility
//! - Hold the optional storage id together with the four audit fields.
//! - Derive persisted/unpersisted state from id presence alone.
//! - Provide the one copy-without-id routine used by all aggregates.
//!
//! # Invariants
//! - `id` is `None` until the first successful insert and is fixed after it.
//! - `created_by`/`time_of_creation` are written once and never rewritten.
//! - `time_of_modification` never moves backwards and never stands still on a
//!   stamp.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage identifier of every aggregate row.
pub type RecordId = Uuid;

/// Unix epoch milliseconds, the timestamp unit of all audit columns.
pub type EpochMillis = i64;

/// Name of whoever performs a write (user name, system account, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Actor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Actor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identity and audit unit embedded in every aggregate root.
///
/// Fields are private so that the id can only be assigned by the insert path
/// and creation metadata can only be written once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persistent {
    id: Option<RecordId>,
    created_by: Option<Actor>,
    time_of_creation: Option<EpochMillis>,
    modified_by: Option<Actor>,
    time_of_modification: Option<EpochMillis>,
}

impl Persistent {
    /// Unpersisted record without any audit metadata.
    ///
    /// The insert path fills creation metadata from the acting actor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unpersisted record whose creation metadata is already decided by the
    /// caller (e.g. a blog entry created on behalf of its author).
    pub fn created(actor: impl Into<Actor>, now: EpochMillis) -> Self {
        let actor = actor.into();
        Self {
            id: None,
            created_by: Some(actor.clone()),
            time_of_creation: Some(now),
            modified_by: Some(actor),
            time_of_modification: Some(now),
        }
    }

    /// Rebuilds the state of a row read back from storage.
    pub fn restored(
        id: RecordId,
        created_by: Actor,
        time_of_creation: EpochMillis,
        modified_by: Actor,
        time_of_modification: EpochMillis,
    ) -> Self {
        Self {
            id: Some(id),
            created_by: Some(created_by),
            time_of_creation: Some(time_of_creation),
            modified_by: Some(modified_by),
            time_of_modification: Some(time_of_modification),
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_not_persisted(&self) -> bool {
        !self.is_persisted()
    }

    pub fn created_by(&self) -> Option<&Actor> {
        self.created_by.as_ref()
    }

    pub fn time_of_creation(&self) -> Option<EpochMillis> {
        self.time_of_creation
    }

    pub fn modified_by(&self) -> Option<&Actor> {
        self.modified_by.as_ref()
    }

    pub fn time_of_modification(&self) -> Option<EpochMillis> {
        self.time_of_modification
    }

    pub fn has_creation_metadata(&self) -> bool {
        self.created_by.is_some() && self.time_of_creation.is_some()
    }

    /// Advances modification metadata to `actor` at `now`.
    ///
    /// When `now` is not later than the previous modification time, the
    /// previous time plus one millisecond is used instead. Creation metadata
    /// and id are left untouched.
    pub fn stamp_modified(&mut self, actor: &Actor, now: EpochMillis) {
        self.modified_by = Some(actor.clone());
        self.time_of_modification = Some(next_modification_time(self.time_of_modification, now));
    }

    /// Writes creation metadata on the insert path.
    ///
    /// Missing modification metadata is initialized to the same values.
    ///
    /// # Panics
    /// - When creation metadata is already present.
    pub fn stamp_created(&mut self, actor: &Actor, now: EpochMillis) {
        assert!(
            self.created_by.is_none() && self.time_of_creation.is_none(),
            "creation metadata is written once; record already created by {:?}",
            self.created_by
        );
        self.created_by = Some(actor.clone());
        self.time_of_creation = Some(now);
        if self.modified_by.is_none() {
            self.modified_by = Some(actor.clone());
        }
        if self.time_of_modification.is_none() {
            self.time_of_modification = Some(now);
        }
    }

    /// Sets the storage generated id after the first insert.
    ///
    /// # Panics
    /// - When the record already carries an id.
    pub(crate) fn assign_id(&mut self, id: RecordId) {
        assert!(
            self.id.is_none(),
            "record is already persisted with id {:?}; refusing to assign {id}",
            self.id
        );
        self.id = Some(id);
    }

    fn clear_id(&mut self) {
        self.id = None;
    }

    /// Projects id and audit fields for mapping layers.
    pub fn to_audit_snapshot(&self) -> AuditSnapshot {
        AuditSnapshot {
            id: self.id,
            created_by: self.created_by.clone(),
            time_of_creation: self.time_of_creation,
            modified_by: self.modified_by.clone(),
            time_of_modification: self.time_of_modification,
        }
    }
}

/// Read-only projection of identity and audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSnapshot {
    pub id: Option<RecordId>,
    pub created_by: Option<Actor>,
    pub time_of_creation: Option<EpochMillis>,
    pub modified_by: Option<Actor>,
    pub time_of_modification: Option<EpochMillis>,
}

/// Contract implemented by every aggregate root that embeds a [`Persistent`].
pub trait Persistable: Clone {
    /// Short entity name used in errors and log events.
    const ENTITY: &'static str;

    fn persistent(&self) -> &Persistent;

    fn persistent_mut(&mut self) -> &mut Persistent;

    /// Foreign keys pointing at storage-owned parents.
    ///
    /// These are cleared by [`copy_without_id`] so a template copy never
    /// reuses a parent reference generated for the original row.
    fn owned_foreign_keys(&mut self) -> Vec<&mut Option<RecordId>> {
        Vec::new()
    }

    /// Fills fields derived from creation metadata, right before insert.
    fn prepare_insert(&mut self) {}

    fn id(&self) -> Option<RecordId> {
        self.persistent().id()
    }

    fn is_persisted(&self) -> bool {
        self.persistent().is_persisted()
    }

    fn is_not_persisted(&self) -> bool {
        self.persistent().is_not_persisted()
    }

    fn copy_without_id(&self) -> Self {
        copy_without_id(self)
    }

    /// Returns this record with modification metadata advanced.
    fn stamp_modified_by(mut self, actor: &Actor, now: EpochMillis) -> Self {
        self.persistent_mut().stamp_modified(actor, now);
        self
    }

    fn to_audit_snapshot(&self) -> AuditSnapshot {
        self.persistent().to_audit_snapshot()
    }
}

/// Clones `record` with its id and storage-owned foreign keys cleared.
///
/// Domain fields and audit metadata are preserved.
pub fn copy_without_id<T: Persistable>(record: &T) -> T {
    let mut copy = record.clone();
    copy.persistent_mut().clear_id();
    for key in copy.owned_foreign_keys() {
        *key = None;
    }
    copy
}

fn next_modification_time(previous: Option<EpochMillis>, now: EpochMillis) -> EpochMillis {
    match previous {
        Some(previous) if now <= previous => previous + 1,
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::{next_modification_time, Actor, Persistent};
    use uuid::Uuid;

    #[test]
    fn modification_time_always_moves_forward() {
        assert_eq!(next_modification_time(None, 10), 10);
        assert_eq!(next_modification_time(Some(5), 10), 10);
        assert_eq!(next_modification_time(Some(10), 10), 11);
        assert_eq!(next_modification_time(Some(20), 10), 21);
    }

    #[test]
    fn stamp_created_fills_missing_modification_metadata() {
        let mut persistent = Persistent::new();
        persistent.stamp_created(&Actor::new("tip"), 100);

        assert_eq!(persistent.created_by().map(Actor::as_str), Some("tip"));
        assert_eq!(persistent.time_of_creation(), Some(100));
        assert_eq!(persistent.modified_by().map(Actor::as_str), Some("tip"));
        assert_eq!(persistent.time_of_modification(), Some(100));
    }

    #[test]
    #[should_panic(expected = "creation metadata is written once")]
    fn stamp_created_twice_fails_fast() {
        let mut persistent = Persistent::created("tip", 100);
        persistent.stamp_created(&Actor::new("other"), 200);
    }

    #[test]
    #[should_panic(expected = "already persisted")]
    fn assign_id_twice_fails_fast() {
        let mut persistent = Persistent::new();
        persistent.assign_id(Uuid::now_v7());
        persistent.assign_id(Uuid::now_v7());
    }
}
