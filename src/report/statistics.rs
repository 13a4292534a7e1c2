use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::models::Dataset;

use super::table::{CellValue, Table};
use super::{actor_production_pairs, Lookup};

/// Number of rows in the most-active-actors table.
pub const TOP_ACTORS_LIMIT: usize = 5;

/// Window for the "new in the last 30 days" totals.
const RECENT_DAYS: i64 = 30;

const UNSPECIFIED_GENRE: &str = "Unspecified";

/// Count occurrences of each key. The result is sorted by count descending,
/// then key ascending, so it does not depend on input order.
pub fn tally<I, K>(keys: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key.into()).or_default() += 1;
    }
    ranked(counts.into_iter().collect())
}

/// Count rows per entity id, then label each group. Grouping happens on the
/// id, so two people with the same name stay apart.
fn tally_ids<I>(ids: I, label: impl Fn(i64) -> String) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = i64>,
{
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    ranked(
        counts
            .into_iter()
            .map(|(id, count)| (label(id), count))
            .collect(),
    )
}

fn ranked(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn tally_table(
    name: &str,
    key_label: &str,
    count_label: &str,
    counts: Vec<(String, usize)>,
) -> Table {
    let mut table = Table::new(name, &[key_label, count_label]);
    for (key, count) in counts {
        table.push_row(vec![key.into(), count.into()]);
    }
    table
}

/// Aggregate tables in a fixed order: totals first, then one table per
/// grouping.
pub fn statistical_tables(dataset: &Dataset, generated_at: NaiveDateTime) -> Vec<Table> {
    let lookup = Lookup::new(dataset);

    vec![
        totals(dataset, generated_at),
        tally_table(
            "Productions per director",
            "Director",
            "Productions",
            tally_ids(
                dataset
                    .productions
                    .iter()
                    .map(|production| production.director_id),
                |id| lookup.director_label(id),
            ),
        ),
        tally_table(
            "Performances per theatre",
            "Theatre",
            "Performances",
            // Theatre names are unique, so grouping by name is grouping by theatre.
            tally(dataset.performances.iter().map(|performance| {
                match lookup.location_theatre(performance.location_id) {
                    Some(theatre_id) => lookup.theatre_name(theatre_id),
                    None => format!("#{}", performance.location_id),
                }
            })),
        ),
        tally_table(
            "Plays per genre",
            "Genre",
            "Plays",
            tally(dataset.plays.iter().map(|play| {
                play.genre
                    .as_deref()
                    .map(str::trim)
                    .filter(|genre| !genre.is_empty())
                    .unwrap_or(UNSPECIFIED_GENRE)
                    .to_string()
            })),
        ),
        tally_table(
            "Rehearsals per month",
            "Month",
            "Rehearsals",
            tally(
                dataset
                    .rehearsals
                    .iter()
                    .map(|rehearsal| rehearsal.datetime.format("%Y-%m").to_string()),
            ),
        ),
        tally_table(
            "Productions per actor",
            "Actor",
            "Productions",
            tally_ids(
                actor_production_pairs(dataset)
                    .into_iter()
                    .map(|(actor_id, _)| actor_id),
                |id| lookup.actor_label(id),
            ),
        ),
        top_actors_by_rehearsals(dataset, &lookup),
    ]
}

fn totals(dataset: &Dataset, generated_at: NaiveDateTime) -> Table {
    let since = generated_at - Duration::days(RECENT_DAYS);
    let is_recent = |created_at: NaiveDateTime| created_at >= since && created_at <= generated_at;

    let mut table = Table::new("Totals", &["Metric", "Value"]);
    for (metric, count) in [
        ("Actors", dataset.actors.len()),
        ("Authors", dataset.authors.len()),
        ("Directors", dataset.directors.len()),
        ("Plays", dataset.plays.len()),
        ("Productions", dataset.productions.len()),
        ("Performances", dataset.performances.len()),
        ("Rehearsals", dataset.rehearsals.len()),
        ("Roles", dataset.roles.len()),
        ("Theatres", dataset.theatres.len()),
        ("Locations", dataset.locations.len()),
        (
            "New actors (last 30 days)",
            dataset
                .actors
                .iter()
                .filter(|actor| is_recent(actor.created_at))
                .count(),
        ),
        (
            "New productions (last 30 days)",
            dataset
                .productions
                .iter()
                .filter(|production| is_recent(production.created_at))
                .count(),
        ),
    ] {
        table.push_row(vec![metric.into(), count.into()]);
    }
    table
}

/// Actors ranked by rehearsal attendance. Actors who never attended still
/// count (with zero) so a small troupe fills the table.
fn top_actors_by_rehearsals(dataset: &Dataset, lookup: &Lookup<'_>) -> Table {
    let mut attended: BTreeMap<i64, usize> =
        dataset.actors.iter().map(|actor| (actor.id, 0)).collect();
    for link in &dataset.actor_rehearsals {
        *attended.entry(link.actor_id).or_default() += 1;
    }

    let mut top = ranked(
        attended
            .into_iter()
            .map(|(actor_id, count)| (lookup.actor_label(actor_id), count))
            .collect(),
    );
    top.truncate(TOP_ACTORS_LIMIT);

    tally_table("Most active actors", "Actor", "Rehearsals", top)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Actor, ActorRehearsal, Director, Production};

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn row(key: &str, count: usize) -> Vec<CellValue> {
        vec![key.into(), count.into()]
    }

    #[test]
    fn tally_sorts_by_count_then_key() {
        let counts = tally(["drama", "comedy", "drama", "tragedy", "comedy", "drama"]);
        assert_eq!(
            counts,
            vec![
                ("drama".to_string(), 3),
                ("comedy".to_string(), 2),
                ("tragedy".to_string(), 1),
            ]
        );
    }

    #[test]
    fn tally_ignores_input_order() {
        let forward = tally(["b", "a", "c", "a", "b"]);
        let backward = tally(["b", "a", "c", "a", "b"].into_iter().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward[0], ("a".to_string(), 2));
        assert_eq!(forward[1], ("b".to_string(), 2));
    }

    fn director(id: i64, name: &str) -> Director {
        Director {
            id,
            full_name: name.into(),
            biography: None,
            created_at: at(1),
            updated_at: None,
        }
    }

    fn production(id: i64, director_id: i64) -> Production {
        Production {
            id,
            title: format!("Production {id}"),
            production_date: None,
            description: None,
            play_id: 1,
            director_id,
            created_at: at(1),
            updated_at: None,
        }
    }

    #[test]
    fn namesakes_are_counted_separately() {
        let dataset = Dataset {
            directors: vec![
                director(1, "John Smith"),
                director(2, "John Smith"),
                director(3, "Ann Lee"),
            ],
            productions: vec![production(10, 1), production(11, 2), production(12, 2)],
            ..Dataset::default()
        };

        let tables = statistical_tables(&dataset, at(20));
        let per_director = &tables[1];
        assert_eq!(per_director.name, "Productions per director");
        assert_eq!(
            per_director.rows,
            vec![row("John Smith (#2)", 2), row("John Smith (#1)", 1)]
        );
    }

    #[test]
    fn groupings_resolve_names() {
        let dataset = Dataset {
            actors: vec![
                Actor {
                    id: 1,
                    full_name: "Ann Lee".into(),
                    experience: None,
                    created_at: at(1),
                    updated_at: None,
                },
                Actor {
                    id: 2,
                    full_name: "Bo Park".into(),
                    experience: None,
                    created_at: at(2),
                    updated_at: None,
                },
            ],
            directors: vec![director(7, "Dana Ross")],
            productions: vec![production(3, 7)],
            actor_rehearsals: vec![
                ActorRehearsal {
                    actor_id: 2,
                    rehearsal_id: 1,
                },
                ActorRehearsal {
                    actor_id: 2,
                    rehearsal_id: 2,
                },
            ],
            ..Dataset::default()
        };

        let tables = statistical_tables(&dataset, at(20));
        let per_director = &tables[1];
        assert_eq!(per_director.rows[0], row("Dana Ross", 1));

        let top = tables.last().unwrap();
        assert_eq!(top.name, "Most active actors");
        assert_eq!(top.rows[0], row("Bo Park", 2));
        assert_eq!(top.rows[1], row("Ann Lee", 0));

        let totals = &tables[0];
        let new_actors = totals
            .rows
            .iter()
            .find(|row| row[0] == CellValue::from("New actors (last 30 days)"))
            .unwrap();
        assert_eq!(new_actors[1], CellValue::from(2_usize));
    }
}
