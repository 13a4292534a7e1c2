//! Domain models that mirror the SQLite schema. Each entity comes in three
//! shapes: the hydrated row (`Actor`), the field set accepted on insert
//! (`NewActor`), and the partial field set accepted on update (`ActorPatch`).
//! Identifiers and timestamps only ever appear on the hydrated row because the
//! database assigns them.
//!
//! All types serialize to and from a flat mapping (a JSON object with the
//! column names as keys) so front-ends and fixtures can exchange rows without
//! going through SQL.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Nullable column inside a patch: `None` leaves the column alone,
/// `Some(None)` clears it, `Some(Some(v))` overwrites it.
pub type Nullable<T> = Option<Option<T>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A member of the troupe who can be cast in productions.
pub struct Actor {
    pub id: i64,
    pub full_name: String,
    /// Free-form description of stage experience.
    pub experience: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewActor {
    pub full_name: String,
    #[serde(default)]
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Nullable<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Writer of one or more plays.
pub struct Author {
    pub id: i64,
    pub full_name: String,
    pub biography: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Stages productions. Shares its shape with [`Author`] but lives in its own
/// table because the relationships differ.
pub struct Director {
    pub id: i64,
    pub full_name: String,
    pub biography: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Insert payload shared by authors and directors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    pub full_name: String,
    #[serde(default)]
    pub biography: Option<String>,
}

/// Update payload shared by authors and directors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Nullable<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub id: i64,
    pub title: String,
    pub genre: Option<String>,
    pub year_written: Option<i32>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPlay {
    pub title: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year_written: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_written: Nullable<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Nullable<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A specific staging of a [`Play`] by one [`Director`].
pub struct Production {
    pub id: i64,
    pub title: String,
    pub production_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub play_id: i64,
    pub director_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduction {
    pub title: String,
    #[serde(default)]
    pub production_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    pub play_id: i64,
    pub director_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Nullable<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Performances and rehearsals share one shape; the kind selects the table.
pub enum EventKind {
    Rehearsal,
    Performance,
}

impl EventKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            EventKind::Rehearsal => "rehearsal",
            EventKind::Performance => "performance",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A scheduled performance or rehearsal of a production at a location.
pub struct Event {
    pub id: i64,
    pub datetime: NaiveDateTime,
    pub location_id: i64,
    pub production_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub type Performance = Event;
pub type Rehearsal = Event;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub datetime: NaiveDateTime,
    pub location_id: i64,
    pub production_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A character defined within a play.
pub struct Role {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub play_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRole {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub play_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theatre {
    pub id: i64,
    /// Globally unique.
    pub name: String,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Theatre {
    /// Join the address parts that are present, e.g. `Verona, Via Roma, 12,
    /// 37121`. Returns an empty string when no part is set.
    pub fn full_address(&self) -> String {
        let mut parts = Vec::new();
        if let Some(city) = &self.city {
            parts.push(city.clone());
        }
        if let Some(street) = &self.street {
            match &self.house_number {
                Some(number) => parts.push(format!("{street}, {number}")),
                None => parts.push(street.clone()),
            }
        }
        if let Some(postal_code) = &self.postal_code {
            parts.push(postal_code.clone());
        }
        parts.join(", ")
    }
}

impl fmt::Display for Theatre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTheatre {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TheatrePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Nullable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Nullable<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A hall or stage inside a [`Theatre`]. The hall name is unique per theatre.
pub struct Location {
    pub id: i64,
    pub theatre_id: i64,
    pub hall_name: String,
    pub capacity: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub theatre_id: i64,
    pub hall_name: String,
    #[serde(default)]
    pub capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theatre_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hall_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Nullable<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Row of `actor_role`: an actor plays a role within one production. The
/// same actor/role pair may recur across productions, so all three ids form
/// the key.
pub struct ActorRole {
    pub actor_id: i64,
    pub role_id: i64,
    pub production_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorProduction {
    pub actor_id: i64,
    pub production_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorRehearsal {
    pub actor_id: i64,
    pub rehearsal_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorPlay {
    pub author_id: i64,
    pub play_id: i64,
}

/// One `(actor, role)` pair in a production's cast, used by
/// [`set_production_cast`](crate::db::set_production_cast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastAssignment {
    pub actor_id: i64,
    pub role_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Join row: who plays what in a production.
pub struct CastMember {
    pub actor_id: i64,
    pub actor_name: String,
    pub role_id: i64,
    pub role_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Join row: one role an actor holds, with the production and play it belongs to.
pub struct ActorRoleDetail {
    pub role_id: i64,
    pub role_title: String,
    pub production_id: i64,
    pub production_title: String,
    pub production_date: Option<NaiveDate>,
    pub play_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Join row: a rehearsal or performance together with where it happens.
pub struct ScheduleEntry {
    pub kind: EventKind,
    pub event_id: i64,
    pub datetime: NaiveDateTime,
    pub production_id: i64,
    pub production_title: String,
    pub location_id: i64,
    pub hall_name: String,
    pub theatre_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Join row for the upcoming-rehearsals view.
pub struct UpcomingRehearsal {
    pub rehearsal_id: i64,
    pub datetime: NaiveDateTime,
    pub production_title: String,
    pub play_title: String,
    pub director_name: String,
    pub theatre_name: String,
    pub hall_name: String,
}

/// Snapshot of every table, handed to the report builder so reports can be
/// assembled without touching the database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub actors: Vec<Actor>,
    pub authors: Vec<Author>,
    pub directors: Vec<Director>,
    pub plays: Vec<Play>,
    pub productions: Vec<Production>,
    pub performances: Vec<Performance>,
    pub rehearsals: Vec<Rehearsal>,
    pub roles: Vec<Role>,
    pub theatres: Vec<Theatre>,
    pub locations: Vec<Location>,
    pub actor_roles: Vec<ActorRole>,
    pub actor_productions: Vec<ActorProduction>,
    pub actor_rehearsals: Vec<ActorRehearsal>,
    pub author_plays: Vec<AuthorPlay>,
}
