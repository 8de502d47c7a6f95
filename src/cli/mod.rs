//! Operator commands that act on the database directly, without the HTTP API.

mod commands;
mod user;

use std::path::PathBuf;

pub use commands::UserCommands;
pub use user::{run_user_create, run_user_remove};

use crate::config::ServerConfig;
use crate::store::SqliteStore;

/// Opens the store under `data_dir`. Refuses to create a fresh database here;
/// `heritage init` owns that.
pub fn init_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let config = ServerConfig {
        data_dir: PathBuf::from(data_dir),
        ..ServerConfig::default()
    };
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "No database at {}. Run 'heritage init' first.",
            db_path.display()
        );
    }

    Ok(SqliteStore::new(&db_path)?)
}
