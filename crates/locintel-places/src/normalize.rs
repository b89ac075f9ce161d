//! Conversion of Places API types into domain types.

use chrono::{DateTime, Utc};
use locintel_core::{IncomingReview, ProfileSnapshot};

use crate::types::{PlaceDetails, PlaceReview};

/// Platform tag stored with reviews fetched from Google.
pub const GOOGLE_PLATFORM: &str = "google";

/// Build the completeness input from place details.
#[must_use]
pub fn profile_snapshot(details: &PlaceDetails) -> ProfileSnapshot {
    ProfileSnapshot {
        name: details.name.clone(),
        address: details.formatted_address.clone(),
        phone: details.formatted_phone_number.clone(),
        website: details.website.clone(),
        has_hours: details.opening_hours.is_some(),
        photo_count: i64::try_from(details.photos.len()).unwrap_or(i64::MAX),
        rating_count: details.user_ratings_total.unwrap_or(0),
        average_rating: details.rating,
    }
}

/// Reviews keyed by `place_id` and the review's unix timestamp.
///
/// Reviews whose timestamp cannot be represented are dropped.
#[must_use]
pub fn place_reviews(place_id: &str, details: &PlaceDetails) -> Vec<IncomingReview> {
    details
        .reviews
        .iter()
        .filter_map(|r| place_review(place_id, r))
        .collect()
}

fn place_review(place_id: &str, review: &PlaceReview) -> Option<IncomingReview> {
    let reviewed_at = DateTime::<Utc>::from_timestamp(review.time, 0)?;
    Some(IncomingReview {
        source_id: place_id.to_string(),
        reviewer_name: Some(review.author_name.clone()),
        rating: review.rating,
        text: review.text.clone(),
        reviewed_at,
        metadata: serde_json::json!({
            "google_place_id": place_id,
            "relative_time": review.relative_time_description,
            "language": review.language.as_deref().unwrap_or("en"),
            "reviewer_profile_url": review.author_url,
            "reviewer_avatar": review.profile_photo_url,
        }),
    })
}
