#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use troupe_ledger::db::*;
use troupe_ledger::models::*;

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn person(name: &str) -> NewPerson {
    NewPerson {
        full_name: name.to_string(),
        biography: None,
    }
}

pub fn actor(name: &str) -> NewActor {
    NewActor {
        full_name: name.to_string(),
        experience: Some("Ten seasons of repertory".to_string()),
    }
}

pub fn theatre(name: &str) -> NewTheatre {
    NewTheatre {
        name: name.to_string(),
        city: Some("London".to_string()),
        ..NewTheatre::default()
    }
}

pub fn hall(theatre_id: i64, name: &str) -> NewLocation {
    NewLocation {
        theatre_id,
        hall_name: name.to_string(),
        capacity: Some(300),
    }
}

pub fn play(title: &str, genre: &str) -> NewPlay {
    NewPlay {
        title: title.to_string(),
        genre: Some(genre.to_string()),
        year_written: Some(1600),
        description: None,
    }
}

/// Ids of the seeded Hamlet production and everything around it.
pub struct Troupe {
    pub author: i64,
    pub director: i64,
    pub play: i64,
    pub theatre: i64,
    pub hall: i64,
    pub production: i64,
    pub prince: i64,
    pub ophelia: i64,
    pub burbage: i64,
    pub terry: i64,
    pub rehearsal: i64,
    pub performance: i64,
}

/// A Hamlet production with one rehearsal on 2024-03-01 18:00 and one
/// performance on 2024-03-15 19:00, both in the Globe's Main Hall.
pub fn hamlet(conn: &Connection) -> Troupe {
    let author = create_author(conn, &person("William Shakespeare")).unwrap();
    let director = create_director(conn, &person("Peter Brook")).unwrap();
    let play = create_play(conn, &play("Hamlet", "Tragedy")).unwrap();
    add_author_to_play(conn, author, play).unwrap();

    let theatre = create_theatre(conn, &theatre("Globe Theatre")).unwrap();
    let hall = create_location(conn, &hall(theatre, "Main Hall")).unwrap();

    let production = create_production(
        conn,
        &NewProduction {
            title: "Hamlet".to_string(),
            production_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            description: Some("Spring season opener".to_string()),
            play_id: play,
            director_id: director,
        },
    )
    .unwrap();

    let prince = create_role(
        conn,
        &NewRole {
            title: "Hamlet".to_string(),
            description: Some("Prince of Denmark".to_string()),
            play_id: play,
        },
    )
    .unwrap();
    let ophelia = create_role(
        conn,
        &NewRole {
            title: "Ophelia".to_string(),
            description: None,
            play_id: play,
        },
    )
    .unwrap();

    let burbage = create_actor(conn, &actor("Richard Burbage")).unwrap();
    let terry = create_actor(conn, &actor("Ellen Terry")).unwrap();
    add_actor_to_production(conn, burbage, production).unwrap();
    add_actor_to_production(conn, terry, production).unwrap();
    add_actor_role(
        conn,
        &ActorRole {
            actor_id: burbage,
            role_id: prince,
            production_id: production,
        },
    )
    .unwrap();
    add_actor_role(
        conn,
        &ActorRole {
            actor_id: terry,
            role_id: ophelia,
            production_id: production,
        },
    )
    .unwrap();

    let rehearsal = create_rehearsal(
        conn,
        &NewEvent {
            datetime: at(2024, 3, 1, 18, 0),
            location_id: hall,
            production_id: production,
        },
    )
    .unwrap();
    add_actor_to_rehearsal(conn, burbage, rehearsal).unwrap();

    let performance = create_performance(
        conn,
        &NewEvent {
            datetime: at(2024, 3, 15, 19, 0),
            location_id: hall,
            production_id: production,
        },
    )
    .unwrap();

    Troupe {
        author,
        director,
        play,
        theatre,
        hall,
        production,
        prince,
        ophelia,
        burbage,
        terry,
        rehearsal,
        performance,
    }
}
