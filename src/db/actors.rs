use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Actor, ActorPatch, NewActor};
use crate::validate;

use super::support::{
    collect_rows, contains_pattern, delete_row, ensure_exists, fetch_by_id, update_row, Changes,
    Conditions, Dependent,
};

const TABLE: &str = "actor";
const COLUMNS: &str = "id, full_name, experience, created_at, updated_at";

/// Link rows go with the actor; nothing else references actors.
const DEPENDENTS: &[Dependent] = &[
    Dependent::cascade("actor_production", "actor_id"),
    Dependent::cascade("actor_rehearsal", "actor_id"),
    Dependent::cascade("actor_role", "actor_id"),
];

#[derive(Debug, Clone, Default)]
pub struct ActorFilter {
    /// Case-insensitive substring of `full_name`.
    pub name_contains: Option<String>,
}

pub(crate) fn actor_from_row(row: &Row<'_>) -> rusqlite::Result<Actor> {
    Ok(Actor {
        id: row.get(0)?,
        full_name: row.get(1)?,
        experience: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Insert a new actor and return the assigned id.
pub fn create_actor(conn: &Connection, actor: &NewActor) -> Result<i64> {
    let full_name = validate::full_name("full_name", &actor.full_name)?;
    let experience = validate::optional_text(actor.experience.as_deref());

    conn.execute(
        "INSERT INTO actor (full_name, experience) VALUES (?1, ?2)",
        params![full_name, experience],
    )?;

    let id = conn.last_insert_rowid();
    info!("created actor {id}");
    Ok(id)
}

pub fn fetch_actor(conn: &Connection, id: i64) -> Result<Actor> {
    fetch_by_id(conn, TABLE, COLUMNS, id, actor_from_row)
}

/// Every actor matching `filter`, ordered by id.
pub fn list_actors(conn: &Connection, filter: &ActorFilter) -> Result<Vec<Actor>> {
    let mut conditions = Conditions::default();
    if let Some(name) = &filter.name_contains {
        conditions.push("LOWER(full_name) LIKE ?", contains_pattern(name));
    }

    let sql = format!("SELECT {COLUMNS} FROM actor{} ORDER BY id", conditions.sql());
    let actors = collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        actor_from_row,
    )?;
    debug!("loaded {} actors", actors.len());
    Ok(actors)
}

pub fn update_actor(conn: &Connection, id: i64, patch: &ActorPatch) -> Result<()> {
    ensure_exists(conn, TABLE, id)?;
    let mut changes = Changes::default();
    if let Some(full_name) = &patch.full_name {
        changes.set("full_name", validate::full_name("full_name", full_name)?);
    }
    if let Some(experience) = &patch.experience {
        changes.set("experience", validate::optional_text(experience.as_deref()));
    }

    update_row(conn, TABLE, id, changes, || format!("actor {id} update rejected"))?;
    info!("updated actor {id}");
    Ok(())
}

/// Remove an actor together with their production, rehearsal, and role links.
pub fn delete_actor(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, TABLE, id, DEPENDENTS)?;
    info!("deleted actor {id}");
    Ok(())
}
