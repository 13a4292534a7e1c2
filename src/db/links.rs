//! Association rows: `actor_production`, `actor_rehearsal`, `actor_role`, and
//! `author_play`. Adding a link that already exists is a no-op, removing one
//! that does not exist is reported, and the `set_*` helpers replace a whole
//! side of a relation in one transaction.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{ActorRole, CastAssignment};

use super::support::{ensure_exists, ensure_reference};

/// Check both ends of an actor/role/production triple, including that the
/// role belongs to the play the production stages.
fn check_actor_role(conn: &Connection, link: &ActorRole) -> Result<()> {
    ensure_reference(conn, "actor_id", "actor", link.actor_id)?;
    ensure_reference(conn, "role_id", "role", link.role_id)?;
    ensure_reference(conn, "production_id", "production", link.production_id)?;

    let (role_play, production_play): (i64, i64) = conn.query_row(
        "SELECT r.play_id, p.play_id FROM role r, production p WHERE r.id = ?1 AND p.id = ?2",
        params![link.role_id, link.production_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    if role_play != production_play {
        return Err(Error::Integrity(format!(
            "role {} belongs to play {role_play}, but production {} stages play {production_play}",
            link.role_id, link.production_id
        )));
    }
    Ok(())
}

pub fn add_actor_to_production(conn: &Connection, actor_id: i64, production_id: i64) -> Result<()> {
    ensure_reference(conn, "actor_id", "actor", actor_id)?;
    ensure_reference(conn, "production_id", "production", production_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO actor_production (actor_id, production_id) VALUES (?1, ?2)",
        params![actor_id, production_id],
    )?;
    debug!("linked actor {actor_id} to production {production_id}");
    Ok(())
}

pub fn remove_actor_from_production(
    conn: &Connection,
    actor_id: i64,
    production_id: i64,
) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM actor_production WHERE actor_id = ?1 AND production_id = ?2",
        params![actor_id, production_id],
    )?;
    if deleted == 0 {
        return Err(Error::not_found("actor_production", actor_id));
    }
    Ok(())
}

pub fn add_actor_to_rehearsal(conn: &Connection, actor_id: i64, rehearsal_id: i64) -> Result<()> {
    ensure_reference(conn, "actor_id", "actor", actor_id)?;
    ensure_reference(conn, "rehearsal_id", "rehearsal", rehearsal_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO actor_rehearsal (actor_id, rehearsal_id) VALUES (?1, ?2)",
        params![actor_id, rehearsal_id],
    )?;
    debug!("linked actor {actor_id} to rehearsal {rehearsal_id}");
    Ok(())
}

pub fn remove_actor_from_rehearsal(
    conn: &Connection,
    actor_id: i64,
    rehearsal_id: i64,
) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM actor_rehearsal WHERE actor_id = ?1 AND rehearsal_id = ?2",
        params![actor_id, rehearsal_id],
    )?;
    if deleted == 0 {
        return Err(Error::not_found("actor_rehearsal", actor_id));
    }
    Ok(())
}

/// Cast an actor in a role for one production.
pub fn add_actor_role(conn: &Connection, link: &ActorRole) -> Result<()> {
    check_actor_role(conn, link)?;
    conn.execute(
        "INSERT OR IGNORE INTO actor_role (actor_id, role_id, production_id) VALUES (?1, ?2, ?3)",
        params![link.actor_id, link.role_id, link.production_id],
    )?;
    debug!(
        "cast actor {} as role {} in production {}",
        link.actor_id, link.role_id, link.production_id
    );
    Ok(())
}

pub fn remove_actor_role(conn: &Connection, link: &ActorRole) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM actor_role WHERE actor_id = ?1 AND role_id = ?2 AND production_id = ?3",
        params![link.actor_id, link.role_id, link.production_id],
    )?;
    if deleted == 0 {
        return Err(Error::not_found("actor_role", link.actor_id));
    }
    Ok(())
}

pub fn add_author_to_play(conn: &Connection, author_id: i64, play_id: i64) -> Result<()> {
    ensure_reference(conn, "author_id", "author", author_id)?;
    ensure_reference(conn, "play_id", "play", play_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO author_play (author_id, play_id) VALUES (?1, ?2)",
        params![author_id, play_id],
    )?;
    debug!("credited author {author_id} on play {play_id}");
    Ok(())
}

pub fn remove_author_from_play(conn: &Connection, author_id: i64, play_id: i64) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM author_play WHERE author_id = ?1 AND play_id = ?2",
        params![author_id, play_id],
    )?;
    if deleted == 0 {
        return Err(Error::not_found("author_play", author_id));
    }
    Ok(())
}

/// Replace the authors credited on a play.
pub fn set_play_authors(conn: &Connection, play_id: i64, author_ids: &[i64]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_exists(&tx, "play", play_id)?;
    tx.execute("DELETE FROM author_play WHERE play_id = ?1", [play_id])?;
    for &author_id in author_ids {
        ensure_reference(&tx, "author_id", "author", author_id)?;
        tx.execute(
            "INSERT OR IGNORE INTO author_play (author_id, play_id) VALUES (?1, ?2)",
            params![author_id, play_id],
        )?;
    }
    tx.commit()?;
    info!("play {play_id} now credits {} author(s)", author_ids.len());
    Ok(())
}

/// Replace the plays credited to an author.
pub fn set_author_plays(conn: &Connection, author_id: i64, play_ids: &[i64]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_exists(&tx, "author", author_id)?;
    tx.execute("DELETE FROM author_play WHERE author_id = ?1", [author_id])?;
    for &play_id in play_ids {
        ensure_reference(&tx, "play_id", "play", play_id)?;
        tx.execute(
            "INSERT OR IGNORE INTO author_play (author_id, play_id) VALUES (?1, ?2)",
            params![author_id, play_id],
        )?;
    }
    tx.commit()?;
    info!("author {author_id} now credited on {} play(s)", play_ids.len());
    Ok(())
}

/// Replace the attendance list of a rehearsal.
pub fn set_rehearsal_actors(conn: &Connection, rehearsal_id: i64, actor_ids: &[i64]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_exists(&tx, "rehearsal", rehearsal_id)?;
    tx.execute(
        "DELETE FROM actor_rehearsal WHERE rehearsal_id = ?1",
        [rehearsal_id],
    )?;
    for &actor_id in actor_ids {
        ensure_reference(&tx, "actor_id", "actor", actor_id)?;
        tx.execute(
            "INSERT OR IGNORE INTO actor_rehearsal (actor_id, rehearsal_id) VALUES (?1, ?2)",
            params![actor_id, rehearsal_id],
        )?;
    }
    tx.commit()?;
    info!("rehearsal {rehearsal_id} now lists {} actor(s)", actor_ids.len());
    Ok(())
}

/// Replace the whole cast of a production. Any invalid assignment rolls the
/// production back to its previous cast.
pub fn set_production_cast(
    conn: &Connection,
    production_id: i64,
    cast: &[CastAssignment],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    ensure_exists(&tx, "production", production_id)?;
    tx.execute(
        "DELETE FROM actor_role WHERE production_id = ?1",
        [production_id],
    )?;
    for assignment in cast {
        let link = ActorRole {
            actor_id: assignment.actor_id,
            role_id: assignment.role_id,
            production_id,
        };
        check_actor_role(&tx, &link)?;
        tx.execute(
            "INSERT OR IGNORE INTO actor_role (actor_id, role_id, production_id) VALUES (?1, ?2, ?3)",
            params![link.actor_id, link.role_id, link.production_id],
        )?;
    }
    tx.commit()?;
    info!("production {production_id} now has {} cast assignment(s)", cast.len());
    Ok(())
}
