//! Database operations for the `location_reviews` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Input record for a review not yet stored.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub platform: String,
    pub external_review_id: String,
    pub reviewer_name: Option<String>,
    pub rating: i16,
    pub review_text: Option<String>,
    pub review_date: DateTime<Utc>,
    pub sentiment: String,
    pub metadata: serde_json::Value,
}

/// A row from the `location_reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub public_id: Uuid,
    pub location_id: i64,
    pub platform: String,
    pub external_review_id: String,
    pub reviewer_name: Option<String>,
    pub rating: i16,
    pub review_text: Option<String>,
    pub review_date: DateTime<Utc>,
    pub sentiment: String,
    pub response_status: String,
    pub response_text: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

const REVIEW_COLUMNS: &str = "id, public_id, location_id, platform, external_review_id, \
     reviewer_name, rating, review_text, review_date, sentiment, response_status, \
     response_text, responded_at, metadata, created_at";

/// Insert a review unless `(location_id, platform, external_review_id)` exists.
///
/// A single `INSERT … ON CONFLICT DO NOTHING` so concurrent ingestions of the
/// same review cannot both insert. Returns `true` when a row was written.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn insert_review_if_absent(
    pool: &PgPool,
    location_id: i64,
    review: &NewReview,
) -> Result<bool, sqlx::Error> {
    let inserted: Option<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO location_reviews \
             (location_id, platform, external_review_id, reviewer_name, rating, \
              review_text, review_date, sentiment, response_status, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9) \
         ON CONFLICT (location_id, platform, external_review_id) DO NOTHING \
         RETURNING id",
    )
    .bind(location_id)
    .bind(&review.platform)
    .bind(&review.external_review_id)
    .bind(&review.reviewer_name)
    .bind(review.rating)
    .bind(&review.review_text)
    .bind(review.review_date)
    .bind(&review.sentiment)
    .bind(&review.metadata)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Most recent reviews of a location, newest first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_reviews_for_location(
    pool: &PgPool,
    location_id: i64,
    limit: i64,
) -> Result<Vec<ReviewRow>, sqlx::Error> {
    sqlx::query_as::<_, ReviewRow>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM location_reviews \
         WHERE location_id = $1 \
         ORDER BY review_date DESC, id DESC \
         LIMIT $2"
    ))
    .bind(location_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Fetch a review by its public UUID.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_review_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<ReviewRow>, sqlx::Error> {
    sqlx::query_as::<_, ReviewRow>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM location_reviews WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await
}

/// Store a reply and flip the review to `responded`.
///
/// Returns the updated row, or `None` if the review does not exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn mark_review_responded(
    pool: &PgPool,
    review_id: i64,
    response_text: &str,
    responded_at: DateTime<Utc>,
) -> Result<Option<ReviewRow>, sqlx::Error> {
    sqlx::query_as::<_, ReviewRow>(&format!(
        "UPDATE location_reviews SET \
             response_status = 'responded', \
             response_text   = $2, \
             responded_at    = $3 \
         WHERE id = $1 \
         RETURNING {REVIEW_COLUMNS}"
    ))
    .bind(review_id)
    .bind(response_text)
    .bind(responded_at)
    .fetch_optional(pool)
    .await
}

/// Raw `(total, responded)` counts for a location on one platform.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_review_responses(
    pool: &PgPool,
    location_id: i64,
    platform: &str,
) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE response_status = 'responded') \
         FROM location_reviews \
         WHERE location_id = $1 AND platform = $2",
    )
    .bind(location_id)
    .bind(platform)
    .fetch_one(pool)
    .await
}
