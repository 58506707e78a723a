//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! This allows running multiple isolated server instances side by side:
//! ```bash
//! DATA_DIR=data/test/a PORT=3001 cargo run
//! DATA_DIR=data/test/b PORT=3002 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database holding cards and tips
pub fn db_path() -> String {
    format!("{}/flashcards.db", data_dir())
}

/// Key/value storage file (viewed-card history)
pub fn storage_path() -> String {
    format!("{}/local_storage.json", data_dir())
}
