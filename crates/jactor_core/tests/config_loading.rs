use jactor_core::db::migrations::latest_version;
use jactor_core::{load_config, open_from_config, ConfigError, PersistenceHandler, SystemClock};
use std::sync::Arc;

#[test]
fn config_file_drives_database_and_actor() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jactor.db");
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "database": { "path": db_path },
            "logging": { "level": "warn" },
            "actor": "batch",
        })
        .to_string(),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.logging.effective_level(), "warn");
    assert_eq!(config.actor().as_str(), "batch");

    let conn = open_from_config(&config.database).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(db_path.exists());

    let handler = PersistenceHandler::new(Arc::new(SystemClock), config.actor());
    assert_eq!(handler.actor().as_str(), "batch");
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = load_config(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn empty_database_path_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{ "database": { "path": "" } }"#).unwrap();

    let err = load_config(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
