//! Per-platform review response statistics in `location_review_stats`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewStatsRow {
    pub location_id: i64,
    pub platform: String,
    pub total_reviews: i32,
    pub responded_count: i32,
    pub response_rate: Decimal,
    pub computed_at: DateTime<Utc>,
}

/// Replace the stats row for `(location_id, platform)`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_review_stats(
    pool: &PgPool,
    stats: &ReviewStatsRow,
) -> Result<ReviewStatsRow, sqlx::Error> {
    sqlx::query_as::<_, ReviewStatsRow>(
        "INSERT INTO location_review_stats \
             (location_id, platform, total_reviews, responded_count, response_rate, computed_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (location_id, platform) DO UPDATE SET \
             total_reviews   = EXCLUDED.total_reviews, \
             responded_count = EXCLUDED.responded_count, \
             response_rate   = EXCLUDED.response_rate, \
             computed_at     = EXCLUDED.computed_at \
         RETURNING location_id, platform, total_reviews, responded_count, \
                   response_rate, computed_at",
    )
    .bind(stats.location_id)
    .bind(&stats.platform)
    .bind(stats.total_reviews)
    .bind(stats.responded_count)
    .bind(stats.response_rate)
    .bind(stats.computed_at)
    .fetch_one(pool)
    .await
}

/// Stats rows for every platform of a location.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_review_stats(
    pool: &PgPool,
    location_id: i64,
) -> Result<Vec<ReviewStatsRow>, sqlx::Error> {
    sqlx::query_as::<_, ReviewStatsRow>(
        "SELECT location_id, platform, total_reviews, responded_count, response_rate, computed_at \
         FROM location_review_stats \
         WHERE location_id = $1 \
         ORDER BY platform",
    )
    .bind(location_id)
    .fetch_all(pool)
    .await
}
