use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{NewPlay, Play, PlayPatch};
use crate::validate;

use super::support::{
    collect_rows, delete_row, ensure_exists, fetch_by_id, update_row, Changes, Conditions,
    Dependent,
};

const TABLE: &str = "play";
const COLUMNS: &str = "id, title, genre, year_written, description, created_at, updated_at";

/// Productions and roles are entities of their own and block the delete;
/// author credits are removed with the play.
const DEPENDENTS: &[Dependent] = &[
    Dependent::reject("production", "play_id"),
    Dependent::reject("role", "play_id"),
    Dependent::cascade("author_play", "play_id"),
];

#[derive(Debug, Clone, Default)]
pub struct PlayFilter {
    /// Exact genre match.
    pub genre: Option<String>,
}

pub(crate) fn play_from_row(row: &Row<'_>) -> rusqlite::Result<Play> {
    Ok(Play {
        id: row.get(0)?,
        title: row.get(1)?,
        genre: row.get(2)?,
        year_written: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn create_play(conn: &Connection, play: &NewPlay) -> Result<i64> {
    let title = validate::title("title", &play.title)?;
    let year_written = validate::year_written(play.year_written)?;

    conn.execute(
        "INSERT INTO play (title, genre, year_written, description) VALUES (?1, ?2, ?3, ?4)",
        params![
            title,
            validate::optional_text(play.genre.as_deref()),
            year_written,
            validate::optional_text(play.description.as_deref()),
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!("created play {id}");
    Ok(id)
}

pub fn fetch_play(conn: &Connection, id: i64) -> Result<Play> {
    fetch_by_id(conn, TABLE, COLUMNS, id, play_from_row)
}

pub fn list_plays(conn: &Connection, filter: &PlayFilter) -> Result<Vec<Play>> {
    let mut conditions = Conditions::default();
    if let Some(genre) = &filter.genre {
        conditions.push("genre = ?", genre.trim().to_string());
    }
    let sql = format!("SELECT {COLUMNS} FROM play{} ORDER BY id", conditions.sql());
    let plays = collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        play_from_row,
    )?;
    debug!("loaded {} plays", plays.len());
    Ok(plays)
}

pub fn update_play(conn: &Connection, id: i64, patch: &PlayPatch) -> Result<()> {
    ensure_exists(conn, TABLE, id)?;
    let mut changes = Changes::default();
    if let Some(title) = &patch.title {
        changes.set("title", validate::title("title", title)?);
    }
    if let Some(genre) = &patch.genre {
        changes.set("genre", validate::optional_text(genre.as_deref()));
    }
    if let Some(year_written) = patch.year_written {
        changes.set("year_written", validate::year_written(year_written)?);
    }
    if let Some(description) = &patch.description {
        changes.set("description", validate::optional_text(description.as_deref()));
    }

    update_row(conn, TABLE, id, changes, || format!("play {id} update rejected"))?;
    info!("updated play {id}");
    Ok(())
}

pub fn delete_play(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, TABLE, id, DEPENDENTS)?;
    info!("deleted play {id}");
    Ok(())
}

/// Distinct, non-empty genres in alphabetical order.
pub fn distinct_genres(conn: &Connection) -> Result<Vec<String>> {
    collect_rows(
        conn,
        "SELECT DISTINCT genre FROM play
         WHERE genre IS NOT NULL AND genre <> ''
         ORDER BY genre",
        [],
        |row| row.get(0),
    )
}
