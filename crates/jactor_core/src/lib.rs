//! Persistence core for the jactor aggregates.
//! Identity, audit stamping, relation resolution and the upsert decision
//! live here; every write path in the workspace goes through this crate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod relation;
pub mod repo;
pub mod service;
pub mod stamp;
pub mod time;

pub use config::{load_config, ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, open_from_config, DbError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::persistent::{
    copy_without_id, Actor, AuditSnapshot, EpochMillis, Persistable, Persistent, RecordId,
};
pub use model::validation::ValidationError;
pub use relation::{RelationListFetcher, RelationSlot};
pub use repo::relations::RelationResolvers;
pub use repo::{upsert, ChildRecordStore, RecordStore, RepoError, RepoResult};
pub use service::persistence_handler::PersistenceHandler;
pub use stamp::ModificationStamper;
pub use time::{Clock, ManualClock, SystemClock};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
