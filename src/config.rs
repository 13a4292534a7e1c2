//! Runtime configuration. Values are read once at startup and handed to the
//! constructors that need them, so nothing below `main.rs` touches the
//! environment.

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".troupe-ledger";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "troupe.sqlite";
/// Reports land here unless the caller picks a destination.
const DEFAULT_REPORTS_DIR: &str = "reports";

pub const DB_PATH_VAR: &str = "TROUPE_DB_PATH";
pub const REPORTS_DIR_VAR: &str = "TROUPE_REPORTS_DIR";
pub const PDF_FONT_VAR: &str = "TROUPE_PDF_FONT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    /// Private in-memory database, dropped with the connection.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseLocation,
    pub reports_dir: PathBuf,
    /// TrueType file embedded in PDF exports. `None` searches the system.
    pub pdf_font: Option<PathBuf>,
}

impl Config {
    /// Build the configuration from `TROUPE_DB_PATH`, `TROUPE_REPORTS_DIR` and
    /// `TROUPE_PDF_FONT`, loading a `.env` file first when one exists.
    pub fn from_env() -> Self {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();

        let database = env::var_os(DB_PATH_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path)
            .map(DatabaseLocation::File)
            .unwrap_or(DatabaseLocation::File(
                PathBuf::from(DATA_DIR_NAME).join(DB_FILE_NAME),
            ));

        let reports_dir = env::var_os(REPORTS_DIR_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR));

        let pdf_font = env::var_os(PDF_FONT_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self {
            database,
            reports_dir,
            pdf_font,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database: DatabaseLocation::Memory,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            pdf_font: None,
        }
    }
}

/// Resolve `<home>/.troupe-ledger/troupe.sqlite`.
fn default_db_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
