//! Persistence layer split across one submodule per entity family. Every
//! function takes a borrowed [`rusqlite::Connection`] so callers decide how
//! long the connection lives and whether the work runs inside a transaction.

mod actors;
mod connection;
mod dataset;
mod events;
mod links;
mod people;
mod plays;
mod productions;
mod queries;
mod roles;
mod support;
mod venues;

pub use actors::{create_actor, delete_actor, fetch_actor, list_actors, update_actor, ActorFilter};
pub use connection::{open, open_memory};
pub use dataset::load_dataset;
pub use events::{
    create_event, create_performance, create_rehearsal, delete_event, delete_performance,
    delete_rehearsal, fetch_event, fetch_performance, fetch_rehearsal, list_events,
    list_performances, list_rehearsals, update_event, update_performance, update_rehearsal,
    EventFilter,
};
pub use links::{
    add_actor_role, add_actor_to_production, add_actor_to_rehearsal, add_author_to_play,
    remove_actor_from_production, remove_actor_from_rehearsal, remove_actor_role,
    remove_author_from_play, set_author_plays, set_play_authors, set_production_cast,
    set_rehearsal_actors,
};
pub use people::{
    create_author, create_director, delete_author, delete_director, fetch_author, fetch_director,
    list_authors, list_directors, update_author, update_director, PersonFilter,
};
pub use plays::{
    create_play, delete_play, distinct_genres, fetch_play, list_plays, update_play, PlayFilter,
};
pub use productions::{
    create_production, delete_production, fetch_production, list_productions, update_production,
    ProductionFilter,
};
pub use queries::{
    actor_roles, actors_for_production, actors_for_rehearsal, authors_for_play, plays_for_author,
    production_cast, production_schedule, upcoming_rehearsals,
};
pub use roles::{
    create_role, delete_role, fetch_role, list_roles, roles_for_play, update_role, RoleFilter,
};
pub use venues::{
    create_location, create_theatre, delete_location, delete_theatre, fetch_location,
    fetch_theatre, list_locations, list_theatres, update_location, update_theatre,
    LocationFilter, TheatreFilter,
};
