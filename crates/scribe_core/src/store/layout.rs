//! On-disk location of the chat database.
//!
//! - `scribe.db` + WAL: chat turns.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Basename of the chat DB (SQLite creates .db-wal and .db-shm alongside).
pub const DATA_DB: &str = "scribe.db";

/// Ensures `data_dir` exists and returns the path of the chat DB inside it.
pub fn ensure_data_dir(data_dir: &Path) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join(DATA_DB))
}
