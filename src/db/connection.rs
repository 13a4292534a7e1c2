use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::{Config, DatabaseLocation};
use crate::error::{Error, Result};

/// Table definitions in creation order. Relationship columns are plain
/// integers: referential integrity is checked by the write helpers in this
/// module tree, not by SQLite. Only uniqueness is declared here.
const SCHEMA: &[(&str, &str)] = &[
    (
        "actor",
        "CREATE TABLE IF NOT EXISTS actor (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            experience TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "author",
        "CREATE TABLE IF NOT EXISTS author (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            biography TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "director",
        "CREATE TABLE IF NOT EXISTS director (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            biography TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "play",
        "CREATE TABLE IF NOT EXISTS play (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            genre TEXT,
            year_written INTEGER,
            description TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "production",
        "CREATE TABLE IF NOT EXISTS production (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            production_date TEXT,
            description TEXT,
            play_id INTEGER NOT NULL,
            director_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "theatre",
        "CREATE TABLE IF NOT EXISTS theatre (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            city TEXT,
            street TEXT,
            house_number TEXT,
            postal_code TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "location",
        "CREATE TABLE IF NOT EXISTS location (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            theatre_id INTEGER NOT NULL,
            hall_name TEXT NOT NULL,
            capacity INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT,
            UNIQUE (theatre_id, hall_name)
        )",
    ),
    (
        "performance",
        "CREATE TABLE IF NOT EXISTS performance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            datetime TEXT NOT NULL,
            location_id INTEGER NOT NULL,
            production_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "rehearsal",
        "CREATE TABLE IF NOT EXISTS rehearsal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            datetime TEXT NOT NULL,
            location_id INTEGER NOT NULL,
            production_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "role",
        "CREATE TABLE IF NOT EXISTS role (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            play_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT
        )",
    ),
    (
        "actor_production",
        "CREATE TABLE IF NOT EXISTS actor_production (
            actor_id INTEGER NOT NULL,
            production_id INTEGER NOT NULL,
            PRIMARY KEY (actor_id, production_id)
        )",
    ),
    (
        "actor_rehearsal",
        "CREATE TABLE IF NOT EXISTS actor_rehearsal (
            actor_id INTEGER NOT NULL,
            rehearsal_id INTEGER NOT NULL,
            PRIMARY KEY (actor_id, rehearsal_id)
        )",
    ),
    (
        "actor_role",
        "CREATE TABLE IF NOT EXISTS actor_role (
            actor_id INTEGER NOT NULL,
            role_id INTEGER NOT NULL,
            production_id INTEGER NOT NULL,
            PRIMARY KEY (actor_id, role_id, production_id)
        )",
    ),
    (
        "author_play",
        "CREATE TABLE IF NOT EXISTS author_play (
            author_id INTEGER NOT NULL,
            play_id INTEGER NOT NULL,
            PRIMARY KEY (author_id, play_id)
        )",
    ),
];

/// Secondary indexes for the relationship columns the join queries filter on.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_production_play ON production (play_id)",
    "CREATE INDEX IF NOT EXISTS idx_production_director ON production (director_id)",
    "CREATE INDEX IF NOT EXISTS idx_performance_production ON performance (production_id, datetime)",
    "CREATE INDEX IF NOT EXISTS idx_rehearsal_production ON rehearsal (production_id, datetime)",
    "CREATE INDEX IF NOT EXISTS idx_role_play ON role (play_id)",
    "CREATE INDEX IF NOT EXISTS idx_actor_role_production ON actor_role (production_id)",
];

/// Open the database described by `config`, creating the parent directory
/// and running the idempotent migrations.
pub fn open(config: &Config) -> Result<Connection> {
    match &config.database {
        DatabaseLocation::Memory => open_memory(),
        DatabaseLocation::File(path) => open_file(path),
    }
}

/// Fresh in-memory database with the full schema. Used by tests and dry runs.
pub fn open_memory() -> Result<Connection> {
    let path = PathBuf::from(":memory:");
    let conn = Connection::open_in_memory().map_err(|source| Error::Connection {
        path: path.clone(),
        source,
    })?;
    ensure_schema(&conn, &path)?;
    Ok(conn)
}

fn open_file(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_owned(),
            source,
        })?;
    }

    let conn = Connection::open(path).map_err(|source| Error::Connection {
        path: path.to_owned(),
        source,
    })?;
    ensure_schema(&conn, path)?;
    info!("opened database at {}", path.display());
    Ok(conn)
}

/// Create any missing tables and indexes.
fn ensure_schema(conn: &Connection, path: &Path) -> Result<()> {
    for (table, sql) in SCHEMA {
        conn.execute(sql, []).map_err(|source| Error::Connection {
            path: path.to_owned(),
            source,
        })?;
        debug!("ensured table {table}");
    }
    for sql in INDEXES {
        conn.execute(sql, []).map_err(|source| Error::Connection {
            path: path.to_owned(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn file_database_creates_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("troupe.sqlite");
        let config = Config {
            database: DatabaseLocation::File(path.clone()),
            reports_dir: dir.path().join("reports"),
            pdf_font: None,
        };

        let conn = open(&config).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'theatre'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
        assert!(path.exists());
    }

    #[test]
    fn unusable_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("plain-file");
        fs::write(&blocker, b"not a directory").unwrap();
        let config = Config {
            database: DatabaseLocation::File(blocker.join("troupe.sqlite")),
            reports_dir: dir.path().join("reports"),
            pdf_font: None,
        };

        let err = open(&config).unwrap_err();
        assert_matches!(err, Error::Io { ref path, .. } if path == &blocker);
    }
}
