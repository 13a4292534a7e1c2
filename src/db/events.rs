//! Performances and rehearsals: same columns, separate tables. The public
//! wrappers pin the [`EventKind`] so callers never pass a table name around.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Event, EventKind, EventPatch, NewEvent};
use crate::validate;

use super::support::{
    collect_rows, delete_row, ensure_exists, ensure_reference, fetch_by_id, update_row, Changes,
    Conditions, Dependent,
};

const COLUMNS: &str = "id, datetime, location_id, production_id, created_at, updated_at";

const REHEARSAL_DEPENDENTS: &[Dependent] = &[Dependent::cascade("actor_rehearsal", "rehearsal_id")];

/// Optional predicates for listing events. The date-time range is half-open:
/// `from <= datetime < to`.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub production_id: Option<i64>,
    pub location_id: Option<i64>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

pub(crate) fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        datetime: row.get(1)?,
        location_id: row.get(2)?,
        production_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn dependents(kind: EventKind) -> &'static [Dependent] {
    match kind {
        EventKind::Rehearsal => REHEARSAL_DEPENDENTS,
        EventKind::Performance => &[],
    }
}

/// Insert a performance or rehearsal after checking its location and
/// production exist.
pub fn create_event(conn: &Connection, kind: EventKind, event: &NewEvent) -> Result<i64> {
    let datetime = validate::event_datetime(event.datetime)?;
    ensure_reference(conn, "location_id", "location", event.location_id)?;
    ensure_reference(conn, "production_id", "production", event.production_id)?;

    let table = kind.table();
    conn.execute(
        &format!("INSERT INTO {table} (datetime, location_id, production_id) VALUES (?1, ?2, ?3)"),
        params![datetime, event.location_id, event.production_id],
    )?;

    let id = conn.last_insert_rowid();
    info!("created {table} {id} at {datetime}");
    Ok(id)
}

pub fn fetch_event(conn: &Connection, kind: EventKind, id: i64) -> Result<Event> {
    fetch_by_id(conn, kind.table(), COLUMNS, id, event_from_row)
}

/// Events matching `filter` in schedule order (date-time, then id).
pub fn list_events(conn: &Connection, kind: EventKind, filter: &EventFilter) -> Result<Vec<Event>> {
    let mut conditions = Conditions::default();
    if let Some(production_id) = filter.production_id {
        conditions.push("production_id = ?", production_id);
    }
    if let Some(location_id) = filter.location_id {
        conditions.push("location_id = ?", location_id);
    }
    if let Some(from) = filter.from {
        conditions.push("datetime >= ?", from.to_string());
    }
    if let Some(to) = filter.to {
        conditions.push("datetime < ?", to.to_string());
    }

    let sql = format!(
        "SELECT {COLUMNS} FROM {}{} ORDER BY datetime, id",
        kind.table(),
        conditions.sql()
    );
    let events = collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        event_from_row,
    )?;
    debug!("loaded {} {kind} rows", events.len());
    Ok(events)
}

pub fn update_event(conn: &Connection, kind: EventKind, id: i64, patch: &EventPatch) -> Result<()> {
    let table = kind.table();
    ensure_exists(conn, table, id)?;
    let mut changes = Changes::default();
    if let Some(datetime) = patch.datetime {
        changes.set("datetime", validate::event_datetime(datetime)?.to_string());
    }
    if let Some(location_id) = patch.location_id {
        ensure_reference(conn, "location_id", "location", location_id)?;
        changes.set("location_id", location_id);
    }
    if let Some(production_id) = patch.production_id {
        ensure_reference(conn, "production_id", "production", production_id)?;
        changes.set("production_id", production_id);
    }

    update_row(conn, table, id, changes, || format!("{table} {id} update rejected"))?;
    info!("updated {table} {id}");
    Ok(())
}

pub fn delete_event(conn: &Connection, kind: EventKind, id: i64) -> Result<()> {
    let table = kind.table();
    delete_row(conn, table, id, dependents(kind))?;
    info!("deleted {table} {id}");
    Ok(())
}

pub fn create_performance(conn: &Connection, performance: &NewEvent) -> Result<i64> {
    create_event(conn, EventKind::Performance, performance)
}

pub fn fetch_performance(conn: &Connection, id: i64) -> Result<Event> {
    fetch_event(conn, EventKind::Performance, id)
}

pub fn list_performances(conn: &Connection, filter: &EventFilter) -> Result<Vec<Event>> {
    list_events(conn, EventKind::Performance, filter)
}

pub fn update_performance(conn: &Connection, id: i64, patch: &EventPatch) -> Result<()> {
    update_event(conn, EventKind::Performance, id, patch)
}

pub fn delete_performance(conn: &Connection, id: i64) -> Result<()> {
    delete_event(conn, EventKind::Performance, id)
}

pub fn create_rehearsal(conn: &Connection, rehearsal: &NewEvent) -> Result<i64> {
    create_event(conn, EventKind::Rehearsal, rehearsal)
}

pub fn fetch_rehearsal(conn: &Connection, id: i64) -> Result<Event> {
    fetch_event(conn, EventKind::Rehearsal, id)
}

pub fn list_rehearsals(conn: &Connection, filter: &EventFilter) -> Result<Vec<Event>> {
    list_events(conn, EventKind::Rehearsal, filter)
}

pub fn update_rehearsal(conn: &Connection, id: i64, patch: &EventPatch) -> Result<()> {
    update_event(conn, EventKind::Rehearsal, id, patch)
}

/// Remove a rehearsal and its attendance list.
pub fn delete_rehearsal(conn: &Connection, id: i64) -> Result<()> {
    delete_event(conn, EventKind::Rehearsal, id)
}
