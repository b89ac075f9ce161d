//! Database operations for the `locations` table.

mod read;
mod types;
mod write;

pub use read::{get_location, get_location_by_public_id, list_location_ids};
pub use types::{ContactBackfill, ListingUpdate, LocationRow, NewLocation, ScoreUpdate};
pub use write::{
    backfill_location_contact, insert_location, set_google_place_id, update_location_listing,
    update_location_scores_if_unchanged,
};
