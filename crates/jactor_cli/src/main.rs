//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the configured database.
//! - Print the core and schema versions for quick local sanity checks.
//!
//! Usage: `jactor_cli [config.json]`

use jactor_core::db::migrations::current_user_version;
use jactor_core::{
    core_version, init_logging_from_config, load_config, open_from_config, CoreConfig,
};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("jactor_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };

    let logging = init_logging_from_config(&config.logging)?;
    let conn = open_from_config(&config.database).map_err(|err| err.to_string())?;
    let schema_version = current_user_version(&conn).map_err(|err| err.to_string())?;

    info!(
        "event=cli_status module=cli status=ok schema_version={schema_version} actor={}",
        config.actor()
    );
    println!("jactor_core version={}", core_version());
    println!("jactor_core schema_version={schema_version}");
    println!("jactor_core logging={}", if logging { "file" } else { "off" });
    Ok(())
}
