use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{NewProduction, Production, ProductionPatch};
use crate::validate;

use super::support::{
    collect_rows, delete_row, ensure_exists, ensure_reference, fetch_by_id, update_row, Changes,
    Conditions, Dependent,
};

const TABLE: &str = "production";
const COLUMNS: &str =
    "id, title, production_date, description, play_id, director_id, created_at, updated_at";

/// Scheduled events block the delete; cast and role links go with it.
const DEPENDENTS: &[Dependent] = &[
    Dependent::reject("performance", "production_id"),
    Dependent::reject("rehearsal", "production_id"),
    Dependent::cascade("actor_production", "production_id"),
    Dependent::cascade("actor_role", "production_id"),
];

#[derive(Debug, Clone, Default)]
pub struct ProductionFilter {
    pub director_id: Option<i64>,
    pub play_id: Option<i64>,
}

pub(crate) fn production_from_row(row: &Row<'_>) -> rusqlite::Result<Production> {
    Ok(Production {
        id: row.get(0)?,
        title: row.get(1)?,
        production_date: row.get(2)?,
        description: row.get(3)?,
        play_id: row.get(4)?,
        director_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a production after checking that its play and director exist.
pub fn create_production(conn: &Connection, production: &NewProduction) -> Result<i64> {
    let title = validate::title("title", &production.title)?;
    let production_date = validate::production_date(production.production_date)?;
    ensure_reference(conn, "play_id", "play", production.play_id)?;
    ensure_reference(conn, "director_id", "director", production.director_id)?;

    conn.execute(
        "INSERT INTO production (title, production_date, description, play_id, director_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            title,
            production_date,
            validate::optional_text(production.description.as_deref()),
            production.play_id,
            production.director_id,
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!("created production {id}");
    Ok(id)
}

pub fn fetch_production(conn: &Connection, id: i64) -> Result<Production> {
    fetch_by_id(conn, TABLE, COLUMNS, id, production_from_row)
}

/// Productions matching `filter`, ordered by id.
pub fn list_productions(conn: &Connection, filter: &ProductionFilter) -> Result<Vec<Production>> {
    let mut conditions = Conditions::default();
    if let Some(director_id) = filter.director_id {
        conditions.push("director_id = ?", director_id);
    }
    if let Some(play_id) = filter.play_id {
        conditions.push("play_id = ?", play_id);
    }
    let sql = format!("SELECT {COLUMNS} FROM production{} ORDER BY id", conditions.sql());
    let productions = collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        production_from_row,
    )?;
    debug!("loaded {} productions", productions.len());
    Ok(productions)
}

pub fn update_production(conn: &Connection, id: i64, patch: &ProductionPatch) -> Result<()> {
    ensure_exists(conn, TABLE, id)?;
    let mut changes = Changes::default();
    if let Some(title) = &patch.title {
        changes.set("title", validate::title("title", title)?);
    }
    if let Some(production_date) = patch.production_date {
        let date = validate::production_date(production_date)?;
        changes.set("production_date", date.map(|date| date.to_string()));
    }
    if let Some(description) = &patch.description {
        changes.set("description", validate::optional_text(description.as_deref()));
    }
    if let Some(play_id) = patch.play_id {
        ensure_reference(conn, "play_id", "play", play_id)?;
        ensure_cast_fits_play(conn, id, play_id)?;
        changes.set("play_id", play_id);
    }
    if let Some(director_id) = patch.director_id {
        ensure_reference(conn, "director_id", "director", director_id)?;
        changes.set("director_id", director_id);
    }

    update_row(conn, TABLE, id, changes, || format!("production {id} update rejected"))?;
    info!("updated production {id}");
    Ok(())
}

/// Moving a production to another play would strand cast rows whose roles
/// belong to the old play.
fn ensure_cast_fits_play(conn: &Connection, production_id: i64, play_id: i64) -> Result<()> {
    let stranded: i64 = conn.query_row(
        "SELECT COUNT(*) FROM actor_role ar
         JOIN role r ON r.id = ar.role_id
         WHERE ar.production_id = ?1 AND r.play_id <> ?2",
        params![production_id, play_id],
        |row| row.get(0),
    )?;
    if stranded > 0 {
        return Err(Error::Integrity(format!(
            "production {production_id} has {stranded} cast assignment(s) for roles outside play {play_id}"
        )));
    }
    Ok(())
}

pub fn delete_production(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, TABLE, id, DEPENDENTS)?;
    info!("deleted production {id}");
    Ok(())
}
