//! Modification stamping applied before every write.
//!
//! # Responsibility
//! - Advance `modified_by`/`time_of_modification` on already persisted
//!   records right before they are written.
//!
//! # Invariants
//! - Unpersisted records pass through unchanged; the insert path owns their
//!   creation metadata.
//! - Creation metadata and id are never touched.
//! - No I/O.

use crate::model::persistent::{Actor, EpochMillis, Persistable};
use crate::time::Clock;
use std::sync::Arc;

/// Stamps modification metadata using an injected clock.
#[derive(Clone)]
pub struct ModificationStamper {
    clock: Arc<dyn Clock>,
}

impl ModificationStamper {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Returns `record` with modification metadata advanced to `actor`/now
    /// when it is persisted, or `record` unchanged otherwise.
    ///
    /// Each call on a persisted record advances the modification time again.
    pub fn apply<T: Persistable>(&self, record: T, actor: &Actor) -> T {
        if record.is_not_persisted() {
            return record;
        }
        record.stamp_modified_by(actor, self.clock.now())
    }

    pub fn now(&self) -> EpochMillis {
        self.clock.now()
    }
}
