mod common;

use assert_matches::assert_matches;
use troupe_ledger::db::*;
use troupe_ledger::models::*;
use troupe_ledger::Error;

use common::{at, hall, hamlet, person, play, theatre};

#[test]
fn theatre_with_locations_cannot_be_deleted() {
    let conn = open_memory().unwrap();
    let theatre_id = create_theatre(&conn, &theatre("Old Vic")).unwrap();
    let hall_id = create_location(&conn, &hall(theatre_id, "Studio")).unwrap();

    let err = delete_theatre(&conn, theatre_id).unwrap_err();
    assert_matches!(
        err,
        Error::Conflict {
            entity: "theatre",
            dependent: "location",
            ..
        }
    );
    assert!(fetch_theatre(&conn, theatre_id).is_ok());

    // A hall with no events goes, and then the theatre can follow.
    delete_location(&conn, hall_id).unwrap();
    delete_theatre(&conn, theatre_id).unwrap();
}

#[test]
fn scheduled_location_cannot_be_deleted() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    let err = delete_location(&conn, troupe.hall).unwrap_err();
    assert_matches!(err, Error::Conflict { entity: "location", .. });
}

#[test]
fn duplicate_theatre_name_is_an_integrity_error() {
    let conn = open_memory().unwrap();
    create_theatre(&conn, &theatre("Globe Theatre")).unwrap();

    let err = create_theatre(&conn, &theatre("Globe Theatre")).unwrap_err();
    assert_matches!(err, Error::Integrity(message) if message.contains("Globe Theatre"));

    let other = create_theatre(&conn, &theatre("Rose Theatre")).unwrap();
    let err = update_theatre(
        &conn,
        other,
        &TheatrePatch {
            name: Some("Globe Theatre".to_string()),
            ..TheatrePatch::default()
        },
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(_));
}

#[test]
fn hall_names_are_unique_per_theatre_only() {
    let conn = open_memory().unwrap();
    let globe = create_theatre(&conn, &theatre("Globe Theatre")).unwrap();
    let rose = create_theatre(&conn, &theatre("Rose Theatre")).unwrap();

    create_location(&conn, &hall(globe, "Main Hall")).unwrap();
    let err = create_location(&conn, &hall(globe, "Main Hall")).unwrap_err();
    assert_matches!(err, Error::Integrity(_));

    create_location(&conn, &hall(rose, "Main Hall")).unwrap();
    let halls = list_locations(&conn, &LocationFilter::default()).unwrap();
    assert_eq!(halls.len(), 2);
}

#[test]
fn missing_references_are_rejected_before_writing() {
    let conn = open_memory().unwrap();
    let director = create_director(&conn, &person("Peter Brook")).unwrap();

    let err = create_production(
        &conn,
        &NewProduction {
            title: "Orphan".to_string(),
            production_date: None,
            description: None,
            play_id: 42,
            director_id: director,
        },
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(message) if message.contains("play_id"));
    assert!(list_productions(&conn, &ProductionFilter::default())
        .unwrap()
        .is_empty());

    let err = create_location(&conn, &hall(7, "Annex")).unwrap_err();
    assert_matches!(err, Error::Integrity(_));
}

#[test]
fn event_references_are_checked_on_update() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    let err = update_performance(
        &conn,
        troupe.performance,
        &EventPatch {
            location_id: Some(troupe.hall + 100),
            ..EventPatch::default()
        },
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(_));
    assert_eq!(
        fetch_performance(&conn, troupe.performance).unwrap().datetime,
        at(2024, 3, 15, 19, 0)
    );
}

#[test]
fn actor_role_rejects_a_role_from_another_play() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);
    let macbeth = create_play(&conn, &play("Macbeth", "Tragedy")).unwrap();
    let lady = create_role(
        &conn,
        &NewRole {
            title: "Lady Macbeth".to_string(),
            description: None,
            play_id: macbeth,
        },
    )
    .unwrap();

    let err = add_actor_role(
        &conn,
        &ActorRole {
            actor_id: troupe.terry,
            role_id: lady,
            production_id: troupe.production,
        },
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(_));

    // Moving a cast role or a cast production to another play is refused too.
    let err = update_role(
        &conn,
        troupe.ophelia,
        &RolePatch {
            play_id: Some(macbeth),
            ..RolePatch::default()
        },
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(_));

    let err = update_production(
        &conn,
        troupe.production,
        &ProductionPatch {
            play_id: Some(macbeth),
            ..ProductionPatch::default()
        },
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(_));
}

#[test]
fn entities_with_dependents_report_conflicts() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    assert_matches!(
        delete_director(&conn, troupe.director),
        Err(Error::Conflict { dependent: "production", .. })
    );
    assert_matches!(
        delete_production(&conn, troupe.production),
        Err(Error::Conflict { entity: "production", .. })
    );
    assert_matches!(
        delete_play(&conn, troupe.play),
        Err(Error::Conflict { entity: "play", .. })
    );

    // Authors only hold credits, which are removed with them.
    delete_author(&conn, troupe.author).unwrap();
    assert!(authors_for_play(&conn, troupe.play).unwrap().is_empty());
}

#[test]
fn unknown_ids_are_not_found() {
    let conn = open_memory().unwrap();

    assert_matches!(
        fetch_theatre(&conn, 1),
        Err(Error::NotFound { entity: "theatre", id: 1 })
    );
    assert_matches!(
        delete_rehearsal(&conn, 5),
        Err(Error::NotFound { entity: "rehearsal", id: 5 })
    );
    assert_matches!(
        update_actor(
            &conn,
            3,
            &ActorPatch {
                full_name: Some("Edmund Kean".to_string()),
                ..ActorPatch::default()
            }
        ),
        Err(Error::NotFound { entity: "actor", id: 3 })
    );
    assert_matches!(
        production_schedule(&conn, 9),
        Err(Error::NotFound { entity: "production", id: 9 })
    );
}

#[test]
fn invalid_fields_never_reach_the_database() {
    let conn = open_memory().unwrap();

    assert_matches!(
        create_actor(
            &conn,
            &NewActor {
                full_name: "R2".to_string(),
                experience: None,
            }
        ),
        Err(Error::Invalid { field: "full_name", .. })
    );
    assert_matches!(
        create_play(
            &conn,
            &NewPlay {
                title: "Ur-Hamlet".to_string(),
                year_written: Some(12),
                ..NewPlay::default()
            }
        ),
        Err(Error::Invalid { field: "year_written", .. })
    );

    let theatre_id = create_theatre(&conn, &theatre("Globe Theatre")).unwrap();
    assert_matches!(
        create_location(
            &conn,
            &NewLocation {
                theatre_id,
                hall_name: "Pit".to_string(),
                capacity: Some(0),
            }
        ),
        Err(Error::Invalid { field: "capacity", .. })
    );
    assert!(list_actors(&conn, &ActorFilter::default()).unwrap().is_empty());
}

#[test]
fn updating_a_missing_row_is_not_found_even_with_bad_references() {
    let conn = open_memory().unwrap();

    assert_matches!(
        update_production(
            &conn,
            999,
            &ProductionPatch {
                play_id: Some(999),
                director_id: Some(999),
                ..ProductionPatch::default()
            }
        ),
        Err(Error::NotFound { entity: "production", id: 999 })
    );
    assert_matches!(
        update_performance(
            &conn,
            7,
            &EventPatch {
                location_id: Some(42),
                ..EventPatch::default()
            }
        ),
        Err(Error::NotFound { entity: "performance", id: 7 })
    );
    assert_matches!(
        update_location(
            &conn,
            3,
            &LocationPatch {
                theatre_id: Some(8),
                ..LocationPatch::default()
            }
        ),
        Err(Error::NotFound { entity: "location", id: 3 })
    );
    assert_matches!(
        update_role(
            &conn,
            4,
            &RolePatch {
                play_id: Some(5),
                ..RolePatch::default()
            }
        ),
        Err(Error::NotFound { entity: "role", id: 4 })
    );
    assert_matches!(
        update_play(
            &conn,
            6,
            &PlayPatch {
                year_written: Some(Some(12)),
                ..PlayPatch::default()
            }
        ),
        Err(Error::NotFound { entity: "play", id: 6 })
    );
}
