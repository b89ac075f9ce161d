//! Listing profile snapshots and completeness.

use chrono::{DateTime, Utc};
use locintel_core::{listing_completeness, ProfileSnapshot};
use locintel_db::{ContactBackfill, ListingUpdate, LocationRow};
use serde::Serialize;
use uuid::Uuid;

use crate::locations::load_location;
use crate::{EngineContext, EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ListingOutcome {
    pub listing_completeness: u8,
    pub google_rating: Option<f64>,
    pub google_review_count: i32,
    pub updated_at: DateTime<Utc>,
}

/// Store a listing snapshot and its completeness percentage.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown location and
/// [`EngineError::InvalidInput`] for a malformed snapshot.
pub async fn update_listing_profile(
    ctx: &EngineContext,
    location: Uuid,
    profile: &ProfileSnapshot,
) -> Result<ListingOutcome, EngineError> {
    check_profile(profile)?;
    let row = load_location(ctx, location).await?;
    apply_listing(ctx, &row, profile).await
}

pub(crate) fn check_profile(profile: &ProfileSnapshot) -> Result<i32, EngineError> {
    profile.validate()?;
    i32::try_from(profile.rating_count).map_err(|_| {
        EngineError::InvalidInput(format!("rating_count {} is too large", profile.rating_count))
    })
}

pub(crate) async fn apply_listing(
    ctx: &EngineContext,
    row: &LocationRow,
    profile: &ProfileSnapshot,
) -> Result<ListingOutcome, EngineError> {
    let google_review_count = check_profile(profile)?;
    let completeness = listing_completeness(profile);
    let update = ListingUpdate {
        google_rating: profile
            .valid_rating()
            .map(|r| locintel_db::round_f64(r, 1)),
        google_review_count,
        listing_completeness: i16::from(completeness),
        updated_at: ctx.now(),
    };

    if !locintel_db::update_location_listing(&ctx.pool, row.id, &update).await? {
        return Err(EngineError::not_found("location", row.public_id));
    }
    tracing::debug!(location = %row.public_id, completeness, "listing profile updated");

    Ok(ListingOutcome {
        listing_completeness: completeness,
        google_rating: update.google_rating,
        google_review_count,
        updated_at: update.updated_at,
    })
}

/// Contact details from a snapshot, used to fill columns the location lacks.
pub(crate) fn contact_from_profile(profile: &ProfileSnapshot) -> ContactBackfill {
    let keep = |s: &Option<String>| s.clone().filter(|v| !v.trim().is_empty());
    ContactBackfill {
        address: keep(&profile.address),
        phone: keep(&profile.phone),
        website: keep(&profile.website),
    }
}
