//! Client for the Google Places API (legacy `place/details` and
//! `place/textsearch` endpoints).

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use normalize::{place_reviews, profile_snapshot, GOOGLE_PLATFORM};
pub use types::{OpeningHours, PlaceDetails, PlacePhoto, PlaceReview};
