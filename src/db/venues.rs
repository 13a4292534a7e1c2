//! Theatres and the halls (locations) inside them. This is where the two
//! uniqueness rules of the schema surface: theatre names are global, hall
//! names are unique per theatre. Both are declared in SQL and mapped to
//! integrity errors here.

use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Location, LocationPatch, NewLocation, NewTheatre, Theatre, TheatrePatch};
use crate::validate;

use super::support::{
    collect_rows, delete_row, ensure_exists, ensure_reference, fetch_by_id, map_constraint,
    update_row, Changes, Conditions, Dependent,
};

const THEATRE_COLUMNS: &str =
    "id, name, city, street, house_number, postal_code, created_at, updated_at";
const LOCATION_COLUMNS: &str = "id, theatre_id, hall_name, capacity, created_at, updated_at";

const THEATRE_DEPENDENTS: &[Dependent] = &[Dependent::reject("location", "theatre_id")];
const LOCATION_DEPENDENTS: &[Dependent] = &[
    Dependent::reject("performance", "location_id"),
    Dependent::reject("rehearsal", "location_id"),
];

#[derive(Debug, Clone, Default)]
pub struct TheatreFilter {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub theatre_id: Option<i64>,
}

pub(crate) fn theatre_from_row(row: &Row<'_>) -> rusqlite::Result<Theatre> {
    Ok(Theatre {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        street: row.get(3)?,
        house_number: row.get(4)?,
        postal_code: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn location_from_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        theatre_id: row.get(1)?,
        hall_name: row.get(2)?,
        capacity: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Insert a theatre. A name already in use fails with an integrity error.
pub fn create_theatre(conn: &Connection, theatre: &NewTheatre) -> Result<i64> {
    let name = validate::title("name", &theatre.name)?;

    conn.execute(
        "INSERT INTO theatre (name, city, street, house_number, postal_code)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            name,
            validate::optional_text(theatre.city.as_deref()),
            validate::optional_text(theatre.street.as_deref()),
            validate::optional_text(theatre.house_number.as_deref()),
            validate::optional_text(theatre.postal_code.as_deref()),
        ],
    )
    .map_err(|err| map_constraint(err, || format!("theatre name '{name}' already exists")))?;

    let id = conn.last_insert_rowid();
    info!("created theatre {id}");
    Ok(id)
}

pub fn fetch_theatre(conn: &Connection, id: i64) -> Result<Theatre> {
    fetch_by_id(conn, "theatre", THEATRE_COLUMNS, id, theatre_from_row)
}

pub fn list_theatres(conn: &Connection, filter: &TheatreFilter) -> Result<Vec<Theatre>> {
    let mut conditions = Conditions::default();
    if let Some(city) = &filter.city {
        conditions.push("city = ?", city.trim().to_string());
    }
    let sql = format!(
        "SELECT {THEATRE_COLUMNS} FROM theatre{} ORDER BY id",
        conditions.sql()
    );
    collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        theatre_from_row,
    )
}

pub fn update_theatre(conn: &Connection, id: i64, patch: &TheatrePatch) -> Result<()> {
    ensure_exists(conn, "theatre", id)?;
    let mut changes = Changes::default();
    let mut new_name = None;
    if let Some(name) = &patch.name {
        let name = validate::title("name", name)?;
        new_name = Some(name.clone());
        changes.set("name", name);
    }
    for (column, value) in [
        ("city", &patch.city),
        ("street", &patch.street),
        ("house_number", &patch.house_number),
        ("postal_code", &patch.postal_code),
    ] {
        if let Some(value) = value {
            changes.set(column, validate::optional_text(value.as_deref()));
        }
    }

    update_row(conn, "theatre", id, changes, || {
        format!(
            "theatre name '{}' already exists",
            new_name.unwrap_or_default()
        )
    })?;
    info!("updated theatre {id}");
    Ok(())
}

/// Remove a theatre. Fails with a conflict while it still has locations.
pub fn delete_theatre(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, "theatre", id, THEATRE_DEPENDENTS)?;
    info!("deleted theatre {id}");
    Ok(())
}

/// Insert a hall into an existing theatre. Reusing a hall name inside the
/// same theatre fails with an integrity error.
pub fn create_location(conn: &Connection, location: &NewLocation) -> Result<i64> {
    let hall_name = validate::title("hall_name", &location.hall_name)?;
    let capacity = validate::capacity(location.capacity)?;
    ensure_reference(conn, "theatre_id", "theatre", location.theatre_id)?;

    conn.execute(
        "INSERT INTO location (theatre_id, hall_name, capacity) VALUES (?1, ?2, ?3)",
        params![location.theatre_id, hall_name, capacity],
    )
    .map_err(|err| {
        map_constraint(err, || {
            format!(
                "hall '{hall_name}' already exists in theatre {}",
                location.theatre_id
            )
        })
    })?;

    let id = conn.last_insert_rowid();
    info!("created location {id}");
    Ok(id)
}

pub fn fetch_location(conn: &Connection, id: i64) -> Result<Location> {
    fetch_by_id(conn, "location", LOCATION_COLUMNS, id, location_from_row)
}

pub fn list_locations(conn: &Connection, filter: &LocationFilter) -> Result<Vec<Location>> {
    let mut conditions = Conditions::default();
    if let Some(theatre_id) = filter.theatre_id {
        conditions.push("theatre_id = ?", theatre_id);
    }
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} FROM location{} ORDER BY id",
        conditions.sql()
    );
    let locations = collect_rows(
        conn,
        &sql,
        rusqlite::params_from_iter(conditions.into_values()),
        location_from_row,
    )?;
    debug!("loaded {} locations", locations.len());
    Ok(locations)
}

pub fn update_location(conn: &Connection, id: i64, patch: &LocationPatch) -> Result<()> {
    ensure_exists(conn, "location", id)?;
    let mut changes = Changes::default();
    if let Some(theatre_id) = patch.theatre_id {
        ensure_reference(conn, "theatre_id", "theatre", theatre_id)?;
        changes.set("theatre_id", theatre_id);
    }
    if let Some(hall_name) = &patch.hall_name {
        changes.set("hall_name", validate::title("hall_name", hall_name)?);
    }
    if let Some(capacity) = patch.capacity {
        changes.set("capacity", validate::capacity(capacity)?);
    }

    update_row(conn, "location", id, changes, || {
        format!("location {id} would duplicate a hall name within its theatre")
    })?;
    info!("updated location {id}");
    Ok(())
}

/// Remove a hall. Fails with a conflict while performances or rehearsals are
/// scheduled there.
pub fn delete_location(conn: &Connection, id: i64) -> Result<()> {
    delete_row(conn, "location", id, LOCATION_DEPENDENTS)?;
    info!("deleted location {id}");
    Ok(())
}
