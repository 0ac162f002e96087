//! Save pipeline shared by every service: stamp, then upsert.
//!
//! # Responsibility
//! - Apply modification stamping and the insert-or-update decision in one
//!   call so no write path can skip either step.
//!
//! # Invariants
//! - Persisted records are stamped before `store.update`.
//! - Unpersisted records get creation and modification metadata from the
//!   handler's actor unless the caller already set creation metadata.

use crate::model::persistent::{Actor, EpochMillis, Persistable};
use crate::repo::{upsert, RecordStore, RepoResult};
use crate::stamp::ModificationStamper;
use crate::time::Clock;
use std::sync::Arc;

/// Writes aggregates on behalf of one actor.
#[derive(Clone)]
pub struct PersistenceHandler {
    stamper: ModificationStamper,
    actor: Actor,
}

impl PersistenceHandler {
    pub fn new(clock: Arc<dyn Clock>, actor: impl Into<Actor>) -> Self {
        Self {
            stamper: ModificationStamper::new(clock),
            actor: actor.into(),
        }
    }

    /// Same clock, different actor.
    pub fn with_actor(&self, actor: impl Into<Actor>) -> Self {
        Self {
            stamper: self.stamper.clone(),
            actor: actor.into(),
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn now(&self) -> EpochMillis {
        self.stamper.now()
    }

    /// Stamps `record` and inserts or updates it through `store`.
    ///
    /// Returns the record as written, with its id assigned on insert.
    pub fn save<T, S>(&self, store: &S, record: T) -> RepoResult<T>
    where
        T: Persistable,
        S: RecordStore<T> + ?Sized,
    {
        let record = self.stamper.apply(record, &self.actor);
        upsert(store, record, &self.actor, self.stamper.now())
    }
}
