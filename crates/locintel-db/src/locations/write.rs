//! Write operations for the `locations` table.

use sqlx::PgPool;

use super::types::{ContactBackfill, ListingUpdate, LocationRow, NewLocation, ScoreUpdate};

/// Insert a location and return the stored row.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails.
pub async fn insert_location(
    pool: &PgPool,
    location: &NewLocation,
) -> Result<LocationRow, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "INSERT INTO locations \
             (client_id, agency_id, business_name, google_place_id, address, phone, website) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, public_id, client_id, agency_id, business_name, \
             google_place_id, address, phone, website, \
             citation_score, review_score, visibility_score, optimization_score, \
             local_seo_score, google_rating, google_review_count, listing_completeness, \
             seo_data_last_updated, gbp_data_last_updated, created_at, updated_at",
    )
    .bind(location.client_id)
    .bind(location.agency_id)
    .bind(&location.business_name)
    .bind(&location.google_place_id)
    .bind(&location.address)
    .bind(&location.phone)
    .bind(&location.website)
    .fetch_one(pool)
    .await
}

/// Write all score columns if no other writer has touched them since they
/// were read.
///
/// Returns `false` when the compare-and-swap on `seo_data_last_updated`
/// matched no row.
///
/// Scores are bound as `float8` and coerced to `NUMERIC(5,2)` by Postgres.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn update_location_scores_if_unchanged(
    pool: &PgPool,
    location_id: i64,
    update: &ScoreUpdate,
) -> Result<bool, sqlx::Error> {
    let rows_affected = sqlx::query(
        "UPDATE locations SET \
             citation_score        = $2::float8, \
             review_score          = $3::float8, \
             visibility_score      = $4::float8, \
             optimization_score    = $5::float8, \
             local_seo_score       = $6::float8, \
             seo_data_last_updated = $7 \
         WHERE id = $1 \
           AND seo_data_last_updated IS NOT DISTINCT FROM $8::timestamptz",
    )
    .bind(location_id)
    .bind(update.scores.citation)
    .bind(update.scores.review)
    .bind(update.scores.visibility)
    .bind(update.scores.optimization)
    .bind(update.overall)
    .bind(update.updated_at)
    .bind(update.expected_last_updated)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected == 1)
}

/// Overwrite the listing-profile columns.
///
/// Returns `false` if the location does not exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn update_location_listing(
    pool: &PgPool,
    location_id: i64,
    update: &ListingUpdate,
) -> Result<bool, sqlx::Error> {
    let rows_affected = sqlx::query(
        "UPDATE locations SET \
             google_rating         = $2::float8, \
             google_review_count   = $3, \
             listing_completeness  = $4, \
             gbp_data_last_updated = $5 \
         WHERE id = $1",
    )
    .bind(location_id)
    .bind(update.google_rating)
    .bind(update.google_review_count)
    .bind(update.listing_completeness)
    .bind(update.updated_at)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected == 1)
}

/// Fill in contact columns that are still NULL. Existing values are kept.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn backfill_location_contact(
    pool: &PgPool,
    location_id: i64,
    contact: &ContactBackfill,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE locations SET \
             address = COALESCE(address, $2), \
             phone   = COALESCE(phone, $3), \
             website = COALESCE(website, $4) \
         WHERE id = $1",
    )
    .bind(location_id)
    .bind(&contact.address)
    .bind(&contact.phone)
    .bind(&contact.website)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record the upstream place id resolved for a location.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn set_google_place_id(
    pool: &PgPool,
    location_id: i64,
    place_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE locations SET google_place_id = $2 WHERE id = $1")
        .bind(location_id)
        .bind(place_id)
        .execute(pool)
        .await?;

    Ok(())
}
