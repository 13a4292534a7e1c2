use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::models::{ActorProduction, ActorRehearsal, ActorRole, AuthorPlay, Dataset};

use super::support::collect_rows;
use super::{
    list_actors, list_authors, list_directors, list_locations, list_performances, list_plays,
    list_productions, list_rehearsals, list_roles, list_theatres,
};

/// Read every table into memory in natural order. The reads share one
/// transaction so the snapshot is consistent.
pub fn load_dataset(conn: &Connection) -> Result<Dataset> {
    let tx = conn.unchecked_transaction()?;

    let dataset = Dataset {
        actors: list_actors(&tx, &Default::default())?,
        authors: list_authors(&tx, &Default::default())?,
        directors: list_directors(&tx, &Default::default())?,
        plays: list_plays(&tx, &Default::default())?,
        productions: list_productions(&tx, &Default::default())?,
        performances: list_performances(&tx, &Default::default())?,
        rehearsals: list_rehearsals(&tx, &Default::default())?,
        roles: list_roles(&tx, &Default::default())?,
        theatres: list_theatres(&tx, &Default::default())?,
        locations: list_locations(&tx, &Default::default())?,
        actor_roles: collect_rows(
            &tx,
            "SELECT actor_id, role_id, production_id FROM actor_role
             ORDER BY production_id, actor_id, role_id",
            [],
            |row| {
                Ok(ActorRole {
                    actor_id: row.get(0)?,
                    role_id: row.get(1)?,
                    production_id: row.get(2)?,
                })
            },
        )?,
        actor_productions: collect_rows(
            &tx,
            "SELECT actor_id, production_id FROM actor_production
             ORDER BY production_id, actor_id",
            [],
            |row| {
                Ok(ActorProduction {
                    actor_id: row.get(0)?,
                    production_id: row.get(1)?,
                })
            },
        )?,
        actor_rehearsals: collect_rows(
            &tx,
            "SELECT actor_id, rehearsal_id FROM actor_rehearsal
             ORDER BY rehearsal_id, actor_id",
            [],
            |row| {
                Ok(ActorRehearsal {
                    actor_id: row.get(0)?,
                    rehearsal_id: row.get(1)?,
                })
            },
        )?,
        author_plays: collect_rows(
            &tx,
            "SELECT author_id, play_id FROM author_play ORDER BY play_id, author_id",
            [],
            |row| {
                Ok(AuthorPlay {
                    author_id: row.get(0)?,
                    play_id: row.get(1)?,
                })
            },
        )?,
    };
    tx.commit()?;

    debug!(
        "loaded dataset: {} productions, {} performances, {} rehearsals",
        dataset.productions.len(),
        dataset.performances.len(),
        dataset.rehearsals.len()
    );
    Ok(dataset)
}
