//! Row-level tables, one per entity plus the joined event and cast views.
//! Rows keep the order the dataset was loaded in (by id, events by date-time).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Dataset, Event};

use super::table::{CellValue, Table};
use super::{actor_production_pairs, Lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Actors,
    Authors,
    Directors,
    Plays,
    Productions,
    Roles,
    Theatres,
    Locations,
    Performances,
    Rehearsals,
    Cast,
}

impl Section {
    /// Sections in the order the detailed report lists them.
    pub const ALL: [Section; 11] = [
        Section::Actors,
        Section::Authors,
        Section::Directors,
        Section::Plays,
        Section::Productions,
        Section::Roles,
        Section::Theatres,
        Section::Locations,
        Section::Performances,
        Section::Rehearsals,
        Section::Cast,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Actors => "Actors",
            Section::Authors => "Authors",
            Section::Directors => "Directors",
            Section::Plays => "Plays",
            Section::Productions => "Productions",
            Section::Roles => "Roles",
            Section::Theatres => "Theatres",
            Section::Locations => "Locations",
            Section::Performances => "Performances",
            Section::Rehearsals => "Rehearsals",
            Section::Cast => "Cast",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Section::ALL
            .into_iter()
            .find(|section| section.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown section '{wanted}'"))
    }
}

pub fn detailed_tables(dataset: &Dataset) -> Vec<Table> {
    let lookup = Lookup::new(dataset);
    Section::ALL
        .into_iter()
        .map(|section| build(section, dataset, &lookup))
        .collect()
}

/// One detailed table on its own.
pub fn section_table(section: Section, dataset: &Dataset) -> Table {
    build(section, dataset, &Lookup::new(dataset))
}

fn build(section: Section, dataset: &Dataset, lookup: &Lookup<'_>) -> Table {
    match section {
        Section::Actors => actors(dataset),
        Section::Authors => authors(dataset),
        Section::Directors => directors(dataset),
        Section::Plays => plays(dataset),
        Section::Productions => productions(dataset, lookup),
        Section::Roles => roles(dataset, lookup),
        Section::Theatres => theatres(dataset),
        Section::Locations => locations(dataset, lookup),
        Section::Performances => events(
            Section::Performances,
            &dataset.performances,
            lookup,
            None,
        ),
        Section::Rehearsals => {
            let attendance = count_by(dataset.actor_rehearsals.iter().map(|l| l.rehearsal_id));
            events(
                Section::Rehearsals,
                &dataset.rehearsals,
                lookup,
                Some(&attendance),
            )
        }
        Section::Cast => cast(dataset, lookup),
    }
}

fn count_by(ids: impl Iterator<Item = i64>) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    counts
}

fn count_of(counts: &HashMap<i64, usize>, id: i64) -> CellValue {
    counts.get(&id).copied().unwrap_or_default().into()
}

fn actors(dataset: &Dataset) -> Table {
    let rehearsals = count_by(dataset.actor_rehearsals.iter().map(|l| l.actor_id));
    let productions = count_by(dataset.actor_productions.iter().map(|l| l.actor_id));

    let mut table = Table::new(
        Section::Actors.label(),
        &["ID", "Full name", "Experience", "Rehearsals", "Productions", "Created"],
    );
    for actor in &dataset.actors {
        table.push_row(vec![
            actor.id.into(),
            actor.full_name.as_str().into(),
            CellValue::truncated(actor.experience.as_deref()),
            count_of(&rehearsals, actor.id),
            count_of(&productions, actor.id),
            CellValue::datetime(Some(actor.created_at)),
        ]);
    }
    table
}

fn authors(dataset: &Dataset) -> Table {
    let plays = count_by(dataset.author_plays.iter().map(|l| l.author_id));

    let mut table = Table::new(
        Section::Authors.label(),
        &["ID", "Full name", "Biography", "Plays"],
    );
    for author in &dataset.authors {
        table.push_row(vec![
            author.id.into(),
            author.full_name.as_str().into(),
            CellValue::truncated(author.biography.as_deref()),
            count_of(&plays, author.id),
        ]);
    }
    table
}

fn directors(dataset: &Dataset) -> Table {
    let productions = count_by(dataset.productions.iter().map(|p| p.director_id));

    let mut table = Table::new(
        Section::Directors.label(),
        &["ID", "Full name", "Biography", "Productions"],
    );
    for director in &dataset.directors {
        table.push_row(vec![
            director.id.into(),
            director.full_name.as_str().into(),
            CellValue::truncated(director.biography.as_deref()),
            count_of(&productions, director.id),
        ]);
    }
    table
}

fn plays(dataset: &Dataset) -> Table {
    let authors: HashMap<i64, &str> = dataset
        .authors
        .iter()
        .map(|author| (author.id, author.full_name.as_str()))
        .collect();
    let mut credits: HashMap<i64, Vec<&str>> = HashMap::new();
    for link in &dataset.author_plays {
        if let Some(&name) = authors.get(&link.author_id) {
            credits.entry(link.play_id).or_default().push(name);
        }
    }

    let mut table = Table::new(
        Section::Plays.label(),
        &["ID", "Title", "Genre", "Year written", "Authors", "Description"],
    );
    for play in &dataset.plays {
        let credited = credits
            .get(&play.id)
            .map(|names| names.join(", "))
            .unwrap_or_default();
        table.push_row(vec![
            play.id.into(),
            play.title.as_str().into(),
            play.genre.as_ref().into(),
            play.year_written.into(),
            credited.into(),
            CellValue::truncated(play.description.as_deref()),
        ]);
    }
    table
}

fn productions(dataset: &Dataset, lookup: &Lookup<'_>) -> Table {
    let performances = count_by(dataset.performances.iter().map(|e| e.production_id));
    let rehearsals = count_by(dataset.rehearsals.iter().map(|e| e.production_id));
    let actors = count_by(
        actor_production_pairs(dataset)
            .into_iter()
            .map(|(_, production_id)| production_id),
    );

    let mut table = Table::new(
        Section::Productions.label(),
        &[
            "ID",
            "Title",
            "Date",
            "Play",
            "Director",
            "Performances",
            "Rehearsals",
            "Actors",
            "Description",
        ],
    );
    for production in &dataset.productions {
        table.push_row(vec![
            production.id.into(),
            production.title.as_str().into(),
            CellValue::date(production.production_date),
            lookup.play_title(production.play_id).into(),
            lookup.director_label(production.director_id).into(),
            count_of(&performances, production.id),
            count_of(&rehearsals, production.id),
            count_of(&actors, production.id),
            CellValue::truncated(production.description.as_deref()),
        ]);
    }
    table
}

fn roles(dataset: &Dataset, lookup: &Lookup<'_>) -> Table {
    let mut table = Table::new(
        Section::Roles.label(),
        &["ID", "Title", "Play", "Description"],
    );
    for role in &dataset.roles {
        table.push_row(vec![
            role.id.into(),
            role.title.as_str().into(),
            lookup.play_title(role.play_id).into(),
            CellValue::truncated(role.description.as_deref()),
        ]);
    }
    table
}

fn theatres(dataset: &Dataset) -> Table {
    let halls = count_by(dataset.locations.iter().map(|l| l.theatre_id));
    let mut capacity: HashMap<i64, i64> = HashMap::new();
    for location in &dataset.locations {
        if let Some(seats) = location.capacity {
            *capacity.entry(location.theatre_id).or_default() += seats;
        }
    }
    let theatre_of: HashMap<i64, i64> = dataset
        .locations
        .iter()
        .map(|location| (location.id, location.theatre_id))
        .collect();
    let performances = count_by(
        dataset
            .performances
            .iter()
            .filter_map(|performance| theatre_of.get(&performance.location_id).copied()),
    );

    let mut table = Table::new(
        Section::Theatres.label(),
        &[
            "ID",
            "Name",
            "Address",
            "Locations",
            "Performances",
            "Total capacity",
        ],
    );
    for theatre in &dataset.theatres {
        table.push_row(vec![
            theatre.id.into(),
            theatre.name.as_str().into(),
            theatre.full_address().into(),
            count_of(&halls, theatre.id),
            count_of(&performances, theatre.id),
            // Blank when no hall has a known capacity.
            capacity.get(&theatre.id).copied().into(),
        ]);
    }
    table
}

fn locations(dataset: &Dataset, lookup: &Lookup<'_>) -> Table {
    let mut table = Table::new(
        Section::Locations.label(),
        &["ID", "Theatre", "Hall", "Capacity"],
    );
    for location in &dataset.locations {
        table.push_row(vec![
            location.id.into(),
            lookup.theatre_name(location.theatre_id).into(),
            location.hall_name.as_str().into(),
            location.capacity.into(),
        ]);
    }
    table
}

/// Performances or rehearsals joined to production, theatre and hall.
/// Rehearsals also carry their attendance count.
fn events(
    section: Section,
    events: &[Event],
    lookup: &Lookup<'_>,
    attendance: Option<&HashMap<i64, usize>>,
) -> Table {
    let mut columns = vec!["ID", "Date/time", "Production", "Theatre", "Hall"];
    if attendance.is_some() {
        columns.push("Actors");
    }

    let mut table = Table::new(section.label(), &columns);
    for event in events {
        let (theatre, hall) = lookup.venue(event.location_id);
        let mut row = vec![
            event.id.into(),
            CellValue::datetime(Some(event.datetime)),
            lookup.production_title(event.production_id).into(),
            theatre.into(),
            hall.into(),
        ];
        if let Some(attendance) = attendance {
            row.push(count_of(attendance, event.id));
        }
        table.push_row(row);
    }
    table
}

fn cast(dataset: &Dataset, lookup: &Lookup<'_>) -> Table {
    let mut table = Table::new(Section::Cast.label(), &["Production", "Role", "Actor"]);
    for link in &dataset.actor_roles {
        table.push_row(vec![
            lookup.production_title(link.production_id).into(),
            lookup.role_title(link.role_id).into(),
            lookup.actor_label(link.actor_id).into(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{ActorProduction, ActorRole, Location, Production, Theatre};

    #[test]
    fn sections_parse_by_label() {
        assert_eq!("performances".parse::<Section>(), Ok(Section::Performances));
        assert_eq!("Cast".parse::<Section>(), Ok(Section::Cast));
        assert!("tickets".parse::<Section>().is_err());
    }

    #[test]
    fn events_resolve_venue_names() {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let datetime = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let dataset = Dataset {
            theatres: vec![Theatre {
                id: 1,
                name: "Globe".into(),
                city: None,
                street: None,
                house_number: None,
                postal_code: None,
                created_at,
                updated_at: None,
            }],
            locations: vec![Location {
                id: 4,
                theatre_id: 1,
                hall_name: "Main Hall".into(),
                capacity: Some(300),
                created_at,
                updated_at: None,
            }],
            performances: vec![Event {
                id: 9,
                datetime,
                location_id: 4,
                production_id: 2,
                created_at,
                updated_at: None,
            }],
            ..Dataset::default()
        };

        let table = section_table(Section::Performances, &dataset);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::from(9_i64),
                CellValue::from("2024-03-15 19:00"),
                CellValue::from("#2"),
                CellValue::from("Globe"),
                CellValue::from("Main Hall"),
            ]
        );

        let locations = section_table(Section::Locations, &dataset);
        assert_eq!(locations.rows[0][3], CellValue::from(300_i64));

        let theatres = section_table(Section::Theatres, &dataset);
        assert_eq!(
            theatres.rows[0][3..],
            [
                CellValue::from(1_usize),
                CellValue::from(1_usize),
                CellValue::from(300_i64),
            ]
        );
    }

    #[test]
    fn productions_carry_event_and_actor_counts() {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let event = |id: i64, production_id: i64| Event {
            id,
            datetime: created_at,
            location_id: 1,
            production_id,
            created_at,
            updated_at: None,
        };
        let dataset = Dataset {
            productions: vec![Production {
                id: 2,
                title: "Hamlet".into(),
                production_date: None,
                description: None,
                play_id: 1,
                director_id: 1,
                created_at,
                updated_at: None,
            }],
            performances: vec![event(1, 2), event(2, 2), event(3, 5)],
            rehearsals: vec![event(1, 2)],
            actor_productions: vec![ActorProduction {
                actor_id: 1,
                production_id: 2,
            }],
            actor_roles: vec![
                ActorRole {
                    actor_id: 1,
                    role_id: 1,
                    production_id: 2,
                },
                ActorRole {
                    actor_id: 3,
                    role_id: 2,
                    production_id: 2,
                },
            ],
            ..Dataset::default()
        };

        let table = section_table(Section::Productions, &dataset);
        assert_eq!(table.columns[5..8], ["Performances", "Rehearsals", "Actors"]);
        assert_eq!(
            table.rows[0][5..8],
            [
                CellValue::from(2_usize),
                CellValue::from(1_usize),
                CellValue::from(2_usize),
            ]
        );
    }

    #[test]
    fn theatres_without_halls_have_blank_capacity() {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dataset = Dataset {
            theatres: vec![Theatre {
                id: 1,
                name: "Rose".into(),
                city: None,
                street: None,
                house_number: None,
                postal_code: None,
                created_at,
                updated_at: None,
            }],
            ..Dataset::default()
        };

        let table = section_table(Section::Theatres, &dataset);
        assert_eq!(table.rows[0][3], CellValue::from(0_usize));
        assert_eq!(table.rows[0][5], CellValue::empty());
    }
}
