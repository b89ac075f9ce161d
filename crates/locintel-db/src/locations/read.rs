//! Read operations for the `locations` table.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::LocationRow;

const LOCATION_COLUMNS: &str = "id, public_id, client_id, agency_id, business_name, \
     google_place_id, address, phone, website, \
     citation_score, review_score, visibility_score, optimization_score, local_seo_score, \
     google_rating, google_review_count, listing_completeness, \
     seo_data_last_updated, gbp_data_last_updated, created_at, updated_at";

/// Fetch a location by its public UUID.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a location by its internal id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location(pool: &PgPool, id: i64) -> Result<Option<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Public ids of every location, oldest first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_location_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>("SELECT public_id FROM locations ORDER BY id")
        .fetch_all(pool)
        .await
}
