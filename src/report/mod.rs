//! Report assembly. Everything here is pure: the builder takes a loaded
//! [`Dataset`] and returns plain tables, leaving I/O to the database layer on
//! one side and the export writers on the other.

mod detailed;
mod statistics;
mod table;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Actor, Dataset, Director, Location, Play, Production, Role, Theatre};

pub use detailed::{detailed_tables, section_table, Section};
pub use statistics::{statistical_tables, tally, TOP_ACTORS_LIMIT};
pub use table::{CellValue, Table, DATETIME_FORMAT, DATE_FORMAT, MAX_TEXT_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Statistical,
    Detailed,
}

impl ReportKind {
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Statistical => "Statistical report",
            ReportKind::Detailed => "Detailed report",
        }
    }

    /// Stem used for default export file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            ReportKind::Statistical => "statistical_report",
            ReportKind::Detailed => "detailed_report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Statistical => f.write_str("statistical"),
            ReportKind::Detailed => f.write_str("detailed"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "statistical" | "stats" => Ok(ReportKind::Statistical),
            "detailed" | "full" => Ok(ReportKind::Detailed),
            other => Err(format!(
                "unknown report kind '{other}' (expected statistical or detailed)"
            )),
        }
    }
}

/// A titled collection of tables ready for export. `generated_at` is part of
/// the value so rendering the same report twice yields the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub tables: Vec<Table>,
}

/// Build a whole report of the given kind from a snapshot.
pub fn build_report(kind: ReportKind, dataset: &Dataset, generated_at: NaiveDateTime) -> Report {
    let tables = match kind {
        ReportKind::Statistical => statistical_tables(dataset, generated_at),
        ReportKind::Detailed => detailed_tables(dataset),
    };
    Report {
        title: kind.title().to_string(),
        generated_at,
        tables,
    }
}

/// Build a report holding a single detailed table.
pub fn build_section_report(
    section: Section,
    dataset: &Dataset,
    generated_at: NaiveDateTime,
) -> Report {
    let table = section_table(section, dataset);
    Report {
        title: format!("{} report", table.name),
        generated_at,
        tables: vec![table],
    }
}

/// Id-keyed views over a dataset used to resolve foreign keys into names.
/// Dangling ids render as `#<id>`.
pub(crate) struct Lookup<'a> {
    actors: HashMap<i64, &'a Actor>,
    directors: HashMap<i64, &'a Director>,
    shared_actor_names: HashSet<&'a str>,
    shared_director_names: HashSet<&'a str>,
    plays: HashMap<i64, &'a Play>,
    productions: HashMap<i64, &'a Production>,
    roles: HashMap<i64, &'a Role>,
    theatres: HashMap<i64, &'a Theatre>,
    locations: HashMap<i64, &'a Location>,
}

impl<'a> Lookup<'a> {
    pub(crate) fn new(dataset: &'a Dataset) -> Self {
        Self {
            actors: dataset.actors.iter().map(|row| (row.id, row)).collect(),
            directors: dataset.directors.iter().map(|row| (row.id, row)).collect(),
            shared_actor_names: shared(dataset.actors.iter().map(|row| row.full_name.as_str())),
            shared_director_names: shared(
                dataset.directors.iter().map(|row| row.full_name.as_str()),
            ),
            plays: dataset.plays.iter().map(|row| (row.id, row)).collect(),
            productions: dataset.productions.iter().map(|row| (row.id, row)).collect(),
            roles: dataset.roles.iter().map(|row| (row.id, row)).collect(),
            theatres: dataset.theatres.iter().map(|row| (row.id, row)).collect(),
            locations: dataset.locations.iter().map(|row| (row.id, row)).collect(),
        }
    }

    fn actor_name(&self, id: i64) -> String {
        self.actors
            .get(&id)
            .map(|actor| actor.full_name.clone())
            .unwrap_or_else(|| dangling(id))
    }

    fn director_name(&self, id: i64) -> String {
        self.directors
            .get(&id)
            .map(|director| director.full_name.clone())
            .unwrap_or_else(|| dangling(id))
    }

    /// Actor name, suffixed with the id when another actor has the same name.
    pub(crate) fn actor_label(&self, id: i64) -> String {
        label(self.actor_name(id), id, &self.shared_actor_names)
    }

    /// Director name, suffixed with the id when another director has the same
    /// name.
    pub(crate) fn director_label(&self, id: i64) -> String {
        label(self.director_name(id), id, &self.shared_director_names)
    }

    pub(crate) fn play_title(&self, id: i64) -> String {
        self.plays
            .get(&id)
            .map(|play| play.title.clone())
            .unwrap_or_else(|| dangling(id))
    }

    pub(crate) fn production_title(&self, id: i64) -> String {
        self.productions
            .get(&id)
            .map(|production| production.title.clone())
            .unwrap_or_else(|| dangling(id))
    }

    pub(crate) fn role_title(&self, id: i64) -> String {
        self.roles
            .get(&id)
            .map(|role| role.title.clone())
            .unwrap_or_else(|| dangling(id))
    }

    pub(crate) fn theatre_name(&self, id: i64) -> String {
        self.theatres
            .get(&id)
            .map(|theatre| theatre.name.clone())
            .unwrap_or_else(|| dangling(id))
    }

    /// Theatre name and hall name of a location.
    pub(crate) fn venue(&self, location_id: i64) -> (String, String) {
        match self.locations.get(&location_id) {
            Some(location) => (
                self.theatre_name(location.theatre_id),
                location.hall_name.clone(),
            ),
            None => (String::new(), dangling(location_id)),
        }
    }

    pub(crate) fn location_theatre(&self, location_id: i64) -> Option<i64> {
        self.locations
            .get(&location_id)
            .map(|location| location.theatre_id)
    }
}

fn dangling(id: i64) -> String {
    format!("#{id}")
}

/// Names that appear more than once.
fn shared<'a>(names: impl Iterator<Item = &'a str>) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut shared = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            shared.insert(name);
        }
    }
    shared
}

fn label(name: String, id: i64, shared: &HashSet<&str>) -> String {
    if shared.contains(name.as_str()) {
        format!("{name} (#{id})")
    } else {
        name
    }
}

/// Distinct (actor, production) pairs, whether the actor joined the
/// production directly or through a role.
pub(crate) fn actor_production_pairs(dataset: &Dataset) -> BTreeSet<(i64, i64)> {
    dataset
        .actor_productions
        .iter()
        .map(|link| (link.actor_id, link.production_id))
        .chain(
            dataset
                .actor_roles
                .iter()
                .map(|link| (link.actor_id, link.production_id)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_kind_parses_case_insensitively() {
        assert_eq!(
            "Statistical".parse::<ReportKind>(),
            Ok(ReportKind::Statistical)
        );
        assert_eq!(
            " detailed ".parse::<ReportKind>(),
            Ok(ReportKind::Detailed)
        );
        assert!("summary".parse::<ReportKind>().is_err());
    }

    #[test]
    fn empty_dataset_still_builds_every_table() {
        let generated_at = chrono::NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let dataset = Dataset::default();

        let detailed = build_report(ReportKind::Detailed, &dataset, generated_at);
        assert_eq!(detailed.tables.len(), Section::ALL.len());
        assert!(detailed.tables.iter().all(Table::is_empty));

        let statistical = build_report(ReportKind::Statistical, &dataset, generated_at);
        assert_eq!(statistical.title, "Statistical report");
        assert_eq!(statistical.generated_at, generated_at);
        assert!(!statistical.tables[0].is_empty());
    }
}
