//! Read-only views that join entities across link tables. Schedule views are
//! ordered by date-time; everything else by identifier so repeated calls
//! return rows in the same order.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::Result;
use crate::models::{
    Actor, ActorRoleDetail, Author, CastMember, EventKind, Play, ScheduleEntry, UpcomingRehearsal,
};

use super::actors::actor_from_row;
use super::people::author_from_row;
use super::plays::play_from_row;
use super::support::{collect_rows, ensure_exists};

/// Actors with the roles they play in one production.
pub fn production_cast(conn: &Connection, production_id: i64) -> Result<Vec<CastMember>> {
    ensure_exists(conn, "production", production_id)?;
    collect_rows(
        conn,
        "SELECT a.id, a.full_name, r.id, r.title
         FROM actor_role ar
         JOIN actor a ON a.id = ar.actor_id
         JOIN role r ON r.id = ar.role_id
         WHERE ar.production_id = ?1
         ORDER BY a.id, r.id",
        [production_id],
        |row| {
            Ok(CastMember {
                actor_id: row.get(0)?,
                actor_name: row.get(1)?,
                role_id: row.get(2)?,
                role_title: row.get(3)?,
            })
        },
    )
}

pub fn actors_for_production(conn: &Connection, production_id: i64) -> Result<Vec<Actor>> {
    ensure_exists(conn, "production", production_id)?;
    collect_rows(
        conn,
        "SELECT a.id, a.full_name, a.experience, a.created_at, a.updated_at
         FROM actor a
         JOIN actor_production ap ON ap.actor_id = a.id
         WHERE ap.production_id = ?1
         ORDER BY a.id",
        [production_id],
        actor_from_row,
    )
}

pub fn actors_for_rehearsal(conn: &Connection, rehearsal_id: i64) -> Result<Vec<Actor>> {
    ensure_exists(conn, "rehearsal", rehearsal_id)?;
    collect_rows(
        conn,
        "SELECT a.id, a.full_name, a.experience, a.created_at, a.updated_at
         FROM actor a
         JOIN actor_rehearsal ar ON ar.actor_id = a.id
         WHERE ar.rehearsal_id = ?1
         ORDER BY a.id",
        [rehearsal_id],
        actor_from_row,
    )
}

pub fn authors_for_play(conn: &Connection, play_id: i64) -> Result<Vec<Author>> {
    ensure_exists(conn, "play", play_id)?;
    collect_rows(
        conn,
        "SELECT a.id, a.full_name, a.biography, a.created_at, a.updated_at
         FROM author a
         JOIN author_play ap ON ap.author_id = a.id
         WHERE ap.play_id = ?1
         ORDER BY a.id",
        [play_id],
        author_from_row,
    )
}

pub fn plays_for_author(conn: &Connection, author_id: i64) -> Result<Vec<Play>> {
    ensure_exists(conn, "author", author_id)?;
    collect_rows(
        conn,
        "SELECT p.id, p.title, p.genre, p.year_written, p.description, p.created_at, p.updated_at
         FROM play p
         JOIN author_play ap ON ap.play_id = p.id
         WHERE ap.author_id = ?1
         ORDER BY p.id",
        [author_id],
        play_from_row,
    )
}

/// Every role an actor holds, with the production and play it belongs to.
pub fn actor_roles(conn: &Connection, actor_id: i64) -> Result<Vec<ActorRoleDetail>> {
    ensure_exists(conn, "actor", actor_id)?;
    collect_rows(
        conn,
        "SELECT r.id, r.title, p.id, p.title, p.production_date, pl.title
         FROM actor_role ar
         JOIN role r ON r.id = ar.role_id
         JOIN production p ON p.id = ar.production_id
         JOIN play pl ON pl.id = p.play_id
         WHERE ar.actor_id = ?1
         ORDER BY p.id, r.id",
        [actor_id],
        |row| {
            Ok(ActorRoleDetail {
                role_id: row.get(0)?,
                role_title: row.get(1)?,
                production_id: row.get(2)?,
                production_title: row.get(3)?,
                production_date: row.get(4)?,
                play_title: row.get(5)?,
            })
        },
    )
}

/// Rehearsals and performances of one production in date-time order.
pub fn production_schedule(conn: &Connection, production_id: i64) -> Result<Vec<ScheduleEntry>> {
    ensure_exists(conn, "production", production_id)?;
    let entries = collect_rows(
        conn,
        "SELECT 'rehearsal' AS kind, e.id AS event_id, e.datetime AS datetime,
                e.production_id, p.title, e.location_id, l.hall_name, t.name
         FROM rehearsal e
         JOIN production p ON p.id = e.production_id
         JOIN location l ON l.id = e.location_id
         JOIN theatre t ON t.id = l.theatre_id
         WHERE e.production_id = ?1
         UNION ALL
         SELECT 'performance', e.id, e.datetime,
                e.production_id, p.title, e.location_id, l.hall_name, t.name
         FROM performance e
         JOIN production p ON p.id = e.production_id
         JOIN location l ON l.id = e.location_id
         JOIN theatre t ON t.id = l.theatre_id
         WHERE e.production_id = ?1
         ORDER BY datetime, kind, event_id",
        [production_id],
        |row| {
            let kind: String = row.get(0)?;
            Ok(ScheduleEntry {
                kind: if kind == "performance" {
                    EventKind::Performance
                } else {
                    EventKind::Rehearsal
                },
                event_id: row.get(1)?,
                datetime: row.get(2)?,
                production_id: row.get(3)?,
                production_title: row.get(4)?,
                location_id: row.get(5)?,
                hall_name: row.get(6)?,
                theatre_name: row.get(7)?,
            })
        },
    )?;
    debug!(
        "production {production_id} has {} scheduled event(s)",
        entries.len()
    );
    Ok(entries)
}

/// The next `limit` rehearsals at or after `after`.
pub fn upcoming_rehearsals(
    conn: &Connection,
    after: NaiveDateTime,
    limit: usize,
) -> Result<Vec<UpcomingRehearsal>> {
    collect_rows(
        conn,
        "SELECT r.id, r.datetime, pr.title, pl.title, d.full_name, t.name, l.hall_name
         FROM rehearsal r
         JOIN production pr ON pr.id = r.production_id
         JOIN play pl ON pl.id = pr.play_id
         JOIN director d ON d.id = pr.director_id
         JOIN location l ON l.id = r.location_id
         JOIN theatre t ON t.id = l.theatre_id
         WHERE r.datetime >= ?1
         ORDER BY r.datetime, r.id
         LIMIT ?2",
        params![after, limit as i64],
        |row| {
            Ok(UpcomingRehearsal {
                rehearsal_id: row.get(0)?,
                datetime: row.get(1)?,
                production_title: row.get(2)?,
                play_title: row.get(3)?,
                director_name: row.get(4)?,
                theatre_name: row.get(5)?,
                hall_name: row.get(6)?,
            })
        },
    )
}
