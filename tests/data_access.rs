mod common;

use assert_matches::assert_matches;
use troupe_ledger::db::*;
use troupe_ledger::models::*;
use troupe_ledger::Error;

use common::{actor, at, hamlet, person, play};

#[test]
fn create_then_read_returns_input_and_server_fields() {
    let conn = open_memory().unwrap();
    let id = create_actor(
        &conn,
        &NewActor {
            full_name: "  Sarah Siddons ".to_string(),
            experience: Some("Drury Lane".to_string()),
        },
    )
    .unwrap();

    let fetched = fetch_actor(&conn, id).unwrap();
    assert!(id > 0);
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.full_name, "Sarah Siddons");
    assert_eq!(fetched.experience.as_deref(), Some("Drury Lane"));
    assert!(fetched.updated_at.is_none());
}

#[test]
fn partial_update_sets_updated_at_and_clears_nullable_fields() {
    let conn = open_memory().unwrap();
    let id = create_play(&conn, &play("The Seagull", "Drama")).unwrap();

    update_play(
        &conn,
        id,
        &PlayPatch {
            title: Some("The Seagull (revised)".to_string()),
            genre: Some(None),
            ..PlayPatch::default()
        },
    )
    .unwrap();

    let updated = fetch_play(&conn, id).unwrap();
    assert_eq!(updated.title, "The Seagull (revised)");
    assert_eq!(updated.genre, None);
    assert_eq!(updated.year_written, Some(1600));
    assert!(updated.updated_at.is_some());
}

#[test]
fn empty_patch_only_checks_existence() {
    let conn = open_memory().unwrap();
    let id = create_director(&conn, &person("Peter Brook")).unwrap();

    update_director(&conn, id, &PersonPatch::default()).unwrap();
    assert!(fetch_director(&conn, id).unwrap().updated_at.is_none());

    let err = update_director(&conn, id + 1, &PersonPatch::default()).unwrap_err();
    assert_matches!(err, Error::NotFound { entity: "director", .. });
}

#[test]
fn list_filters_narrow_results() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);
    create_actor(&conn, &actor("Edmund Kean")).unwrap();
    create_play(&conn, &play("Volpone", "Comedy")).unwrap();

    let ellens = list_actors(
        &conn,
        &ActorFilter {
            name_contains: Some("ELLEN".to_string()),
        },
    )
    .unwrap();
    assert_eq!(ellens.len(), 1);
    assert_eq!(ellens[0].id, troupe.terry);

    let comedies = list_plays(
        &conn,
        &PlayFilter {
            genre: Some("Comedy".to_string()),
        },
    )
    .unwrap();
    assert_eq!(comedies.len(), 1);
    assert_eq!(comedies[0].title, "Volpone");

    let in_march = list_rehearsals(
        &conn,
        &EventFilter {
            from: Some(at(2024, 3, 1, 0, 0)),
            to: Some(at(2024, 4, 1, 0, 0)),
            ..EventFilter::default()
        },
    )
    .unwrap();
    assert_eq!(in_march.len(), 1);

    let after_rehearsal = list_rehearsals(
        &conn,
        &EventFilter {
            from: Some(at(2024, 3, 1, 18, 1)),
            ..EventFilter::default()
        },
    )
    .unwrap();
    assert!(after_rehearsal.is_empty());

    let by_director = list_productions(
        &conn,
        &ProductionFilter {
            director_id: Some(troupe.director),
            ..ProductionFilter::default()
        },
    )
    .unwrap();
    assert_eq!(by_director.len(), 1);

    assert_eq!(
        distinct_genres(&conn).unwrap(),
        vec!["Comedy".to_string(), "Tragedy".to_string()]
    );
}

#[test]
fn adding_a_link_twice_is_a_no_op() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    add_actor_to_production(&conn, troupe.burbage, troupe.production).unwrap();
    add_author_to_play(&conn, troupe.author, troupe.play).unwrap();

    assert_eq!(actors_for_production(&conn, troupe.production).unwrap().len(), 2);
    assert_eq!(authors_for_play(&conn, troupe.play).unwrap().len(), 1);
}

#[test]
fn removing_a_missing_link_is_not_found() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    remove_actor_from_rehearsal(&conn, troupe.burbage, troupe.rehearsal).unwrap();
    let err = remove_actor_from_rehearsal(&conn, troupe.burbage, troupe.rehearsal).unwrap_err();
    assert_matches!(err, Error::NotFound { entity: "actor_rehearsal", .. });
    assert!(actors_for_rehearsal(&conn, troupe.rehearsal).unwrap().is_empty());
}

#[test]
fn deleting_an_actor_cascades_to_link_rows() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    delete_actor(&conn, troupe.burbage).unwrap();

    let cast = production_cast(&conn, troupe.production).unwrap();
    assert_eq!(cast.len(), 1);
    assert_eq!(cast[0].actor_id, troupe.terry);
    assert!(actors_for_rehearsal(&conn, troupe.rehearsal).unwrap().is_empty());
    assert_matches!(
        fetch_actor(&conn, troupe.burbage),
        Err(Error::NotFound { entity: "actor", .. })
    );
}

#[test]
fn deleting_a_rehearsal_drops_its_attendance() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    delete_rehearsal(&conn, troupe.rehearsal).unwrap();

    let dataset = load_dataset(&conn).unwrap();
    assert!(dataset.rehearsals.is_empty());
    assert!(dataset.actor_rehearsals.is_empty());
}

#[test]
fn replace_all_links_swap_the_whole_side() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);
    let fletcher = create_author(&conn, &person("John Fletcher")).unwrap();

    set_play_authors(&conn, troupe.play, &[fletcher]).unwrap();
    let authors = authors_for_play(&conn, troupe.play).unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].id, fletcher);
    assert!(plays_for_author(&conn, troupe.author).unwrap().is_empty());

    set_rehearsal_actors(&conn, troupe.rehearsal, &[troupe.terry, troupe.burbage]).unwrap();
    let attending: Vec<i64> = actors_for_rehearsal(&conn, troupe.rehearsal)
        .unwrap()
        .into_iter()
        .map(|actor| actor.id)
        .collect();
    assert_eq!(attending, vec![troupe.burbage, troupe.terry]);
}

#[test]
fn invalid_cast_rolls_back_the_replacement() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    let err = set_production_cast(
        &conn,
        troupe.production,
        &[
            CastAssignment {
                actor_id: troupe.terry,
                role_id: troupe.prince,
            },
            CastAssignment {
                actor_id: troupe.burbage,
                role_id: 999,
            },
        ],
    )
    .unwrap_err();
    assert_matches!(err, Error::Integrity(_));

    let cast = production_cast(&conn, troupe.production).unwrap();
    assert_eq!(cast.len(), 2);
    assert_eq!(cast[0].role_id, troupe.prince);
    assert_eq!(cast[0].actor_id, troupe.burbage);
}

#[test]
fn actor_roles_lists_production_and_play() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    let roles = actor_roles(&conn, troupe.terry).unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role_title, "Ophelia");
    assert_eq!(roles[0].production_title, "Hamlet");
    assert_eq!(roles[0].play_title, "Hamlet");

    assert_eq!(roles_for_play(&conn, troupe.play).unwrap().len(), 2);
}

#[test]
fn upcoming_rehearsals_are_ordered_and_limited() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);
    for day in [20, 10, 25] {
        create_rehearsal(
            &conn,
            &NewEvent {
                datetime: at(2024, 3, day, 10, 0),
                location_id: troupe.hall,
                production_id: troupe.production,
            },
        )
        .unwrap();
    }

    let upcoming = upcoming_rehearsals(&conn, at(2024, 3, 5, 0, 0), 2).unwrap();
    let days: Vec<String> = upcoming
        .iter()
        .map(|rehearsal| rehearsal.datetime.format("%d").to_string())
        .collect();
    assert_eq!(days, vec!["10", "20"]);
    assert_eq!(upcoming[0].director_name, "Peter Brook");
    assert_eq!(upcoming[0].theatre_name, "Globe Theatre");
    assert_eq!(upcoming[0].hall_name, "Main Hall");
}

#[test]
fn dataset_snapshot_holds_every_table() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);

    let dataset = load_dataset(&conn).unwrap();
    assert_eq!(dataset.actors.len(), 2);
    assert_eq!(dataset.productions[0].id, troupe.production);
    assert_eq!(dataset.locations[0].hall_name, "Main Hall");
    assert_eq!(dataset.actor_roles.len(), 2);
    assert_eq!(dataset.actor_productions.len(), 2);
    assert_eq!(dataset.author_plays.len(), 1);
}

#[test]
fn models_map_to_flat_json_objects() {
    let conn = open_memory().unwrap();
    let troupe = hamlet(&conn);
    let production = fetch_production(&conn, troupe.production).unwrap();

    let json = serde_json::to_value(&production).unwrap();
    assert_eq!(json["title"], "Hamlet");
    assert_eq!(json["production_date"], "2024-03-15");
    assert_eq!(json["play_id"], troupe.play);

    let back: Production = serde_json::from_value(json).unwrap();
    assert_eq!(back, production);

    let patch: ActorPatch = serde_json::from_str(r#"{"full_name": "Edmund Kean"}"#).unwrap();
    assert_eq!(patch.full_name.as_deref(), Some("Edmund Kean"));
    assert_eq!(patch.experience, None);
    assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"full_name":"Edmund Kean"}"#);
}
