use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{NewRole, Role, RolePatch};
use crate::validate;

use super::support::{
    collect_rows, delete_row, ensure_exists, ensure_reference, fetch_by_id, update_row, Changes,
    Conditions, Dependent,
};

const TABLE: &str = "role";
const COLUMNS: &str = "id, title, description, play_id, created_at, updated_at";

const DEPENDENTS: &[Dependent] = &[Dependent::cascade("actor_role", "role_id")];

#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    pub play_id: Option<i64>,
}

pub(crate) fn role_from_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        play_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn create_role(conn: &Connection, role: &NewRole) -> Result<i64> {
    let title = validate::title("title", &role.title)?;
    ensure_reference(conn, "play_id", "play", role.play_id)?;

    conn.execute(
        "INSERT INTO role (title, description, play_id) VALUES (?1, ?2, ?3)",
        params![
            title,
            validate::optional_text(role.description.as_deref()),
            role.play_id
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!("created role {id}");
    Ok(id)
}

pub fn fetch_role(conn: &Connection, id: i64) -> Result<Role> {
    fetch_by_id(conn, TABLE, COLUMNS, id, role_from_row)
}

pub fn list_roles(conn: &Connection, filter: &RoleFilter) -> Result<Vec<Role>> {
    let mut conditions = Conditions::default();
    if let Some(play_id) = filter.play_id {
        conditions.push("play_id = ?", play_id);
    }
    let sql = format!("SELECT {COLUMNS} FROM role{} ORDER BY id", conditions.sql());
    collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        role_from_row,
    )
}

/// Roles of one play, ordered by id.
pub fn roles_for_play(conn: &Connection, play_id: i64) -> Result<Vec<Role>> {
    list_roles(
        conn,
        &RoleFilter {
            play_id: Some(play_id),
        },
    )
}

pub fn update_role(conn: &Connection, id: i64, patch: &RolePatch) -> Result<()> {
    ensure_exists(conn, TABLE, id)?;
    let mut changes = Changes::default();
    if let Some(title) = &patch.title {
        changes.set("title", validate::title("title", title)?);
    }
    if let Some(description) = &patch.description {
        changes.set("description", validate::optional_text(description.as_deref()));
    }
    if let Some(play_id) = patch.play_id {
        ensure_reference(conn, "play_id", "play", play_id)?;
        ensure_castings_fit_play(conn, id, play_id)?;
        changes.set("play_id", play_id);
    }

    update_row(conn, TABLE, id, changes, || format!("role {id} update rejected"))?;
    info!("updated role {id}");
    Ok(())
}

/// A role that is already cast may only move to the play its productions stage.
fn ensure_castings_fit_play(conn: &Connection, role_id: i64, play_id: i64) -> Result<()> {
    let stranded: i64 = conn.query_row(
        "SELECT COUNT(*) FROM actor_role ar
         JOIN production p ON p.id = ar.production_id
         WHERE ar.role_id = ?1 AND p.play_id <> ?2",
        params![role_id, play_id],
        |row| row.get(0),
    )?;
    if stranded > 0 {
        return Err(Error::Integrity(format!(
            "role {role_id} is cast in {stranded} production(s) of another play"
        )));
    }
    Ok(())
}

/// Remove a role and every casting of it.
pub fn delete_role(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, TABLE, id, DEPENDENTS)?;
    info!("deleted role {id}");
    Ok(())
}
