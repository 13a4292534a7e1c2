//! Authors and directors share a row shape (`full_name`, `biography`), so the
//! SQL lives in one set of private helpers keyed by table name. The public
//! functions differ only in which table they hit and which rows depend on it.

use rusqlite::{params, Connection, Row};
use tracing::info;

use crate::error::Result;
use crate::models::{Author, Director, NewPerson, PersonPatch};
use crate::validate;

use super::support::{
    collect_rows, contains_pattern, delete_row, ensure_exists, fetch_by_id, update_row, Changes,
    Conditions, Dependent,
};

const COLUMNS: &str = "id, full_name, biography, created_at, updated_at";

const AUTHOR_DEPENDENTS: &[Dependent] = &[Dependent::cascade("author_play", "author_id")];
const DIRECTOR_DEPENDENTS: &[Dependent] = &[Dependent::reject("production", "director_id")];

#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
    /// Case-insensitive substring of `full_name`.
    pub name_contains: Option<String>,
}

pub(crate) fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        full_name: row.get(1)?,
        biography: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub(crate) fn director_from_row(row: &Row<'_>) -> rusqlite::Result<Director> {
    Ok(Director {
        id: row.get(0)?,
        full_name: row.get(1)?,
        biography: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn insert_person(conn: &Connection, table: &'static str, person: &NewPerson) -> Result<i64> {
    let full_name = validate::full_name("full_name", &person.full_name)?;
    let biography = validate::optional_text(person.biography.as_deref());

    conn.execute(
        &format!("INSERT INTO {table} (full_name, biography) VALUES (?1, ?2)"),
        params![full_name, biography],
    )?;

    let id = conn.last_insert_rowid();
    info!("created {table} {id}");
    Ok(id)
}

fn list_people<T>(
    conn: &Connection,
    table: &'static str,
    filter: &PersonFilter,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut conditions = Conditions::default();
    if let Some(name) = &filter.name_contains {
        conditions.push("LOWER(full_name) LIKE ?", contains_pattern(name));
    }
    let sql = format!("SELECT {COLUMNS} FROM {table}{} ORDER BY id", conditions.sql());
    collect_rows(conn, &sql, rusqlite::params_from_iter(conditions.into_values()), map)
}

fn update_person(
    conn: &Connection,
    table: &'static str,
    id: i64,
    patch: &PersonPatch,
) -> Result<()> {
    ensure_exists(conn, table, id)?;
    let mut changes = Changes::default();
    if let Some(full_name) = &patch.full_name {
        changes.set("full_name", validate::full_name("full_name", full_name)?);
    }
    if let Some(biography) = &patch.biography {
        changes.set("biography", validate::optional_text(biography.as_deref()));
    }

    update_row(conn, table, id, changes, || format!("{table} {id} update rejected"))?;
    info!("updated {table} {id}");
    Ok(())
}

pub fn create_author(conn: &Connection, author: &NewPerson) -> Result<i64> {
    insert_person(conn, "author", author)
}

pub fn fetch_author(conn: &Connection, id: i64) -> Result<Author> {
    fetch_by_id(conn, "author", COLUMNS, id, author_from_row)
}

pub fn list_authors(conn: &Connection, filter: &PersonFilter) -> Result<Vec<Author>> {
    list_people(conn, "author", filter, author_from_row)
}

pub fn update_author(conn: &Connection, id: i64, patch: &PersonPatch) -> Result<()> {
    update_person(conn, "author", id, patch)
}

/// Remove an author; their play credits go with them.
pub fn delete_author(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, "author", id, AUTHOR_DEPENDENTS)?;
    info!("deleted author {id}");
    Ok(())
}

pub fn create_director(conn: &Connection, director: &NewPerson) -> Result<i64> {
    insert_person(conn, "director", director)
}

pub fn fetch_director(conn: &Connection, id: i64) -> Result<Director> {
    fetch_by_id(conn, "director", COLUMNS, id, director_from_row)
}

pub fn list_directors(conn: &Connection, filter: &PersonFilter) -> Result<Vec<Director>> {
    list_people(conn, "director", filter, director_from_row)
}

pub fn update_director(conn: &Connection, id: i64, patch: &PersonPatch) -> Result<()> {
    update_person(conn, "director", id, patch)
}

/// Remove a director. Fails with a conflict while any production names them.
pub fn delete_director(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, "director", id, DIRECTOR_DEPENDENTS)?;
    info!("deleted director {id}");
    Ok(())
}
