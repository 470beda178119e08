//! Path constants for the on-disk store database.

use std::path::PathBuf;

/// The name of the data directory under ~/.config/
pub const DATA_DIR_NAME: &str = "auricle";

/// The name of the key-value store database file
pub const STORE_DB_FILE_NAME: &str = "store.db";

/// Get the data directory path (~/.config/auricle/)
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(DATA_DIR_NAME)
}

/// Get the store database path (`~/.config/auricle/store.db`)
#[must_use]
pub fn store_db_path() -> PathBuf {
    data_dir().join(STORE_DB_FILE_NAME)
}
