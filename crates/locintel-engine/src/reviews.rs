//! Review ingestion, deduplication, and response tracking.

use chrono::{DateTime, Utc};
use locintel_core::{response_rate, IncomingReview};
use locintel_db::{f64_to_decimal, LocationRow, NewReview, ReviewRow, ReviewStatsRow};
use serde::Serialize;
use uuid::Uuid;

use crate::locations::load_location;
use crate::{EngineContext, EngineError};

/// Counts from one ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub found_total: usize,
    pub newly_inserted: usize,
    pub skipped_existing: usize,
    pub response_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    pub id: Uuid,
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
}

impl From<ReviewRow> for ReviewView {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.public_id,
            platform: row.platform,
            external_review_id: row.external_review_id,
            reviewer_name: row.reviewer_name,
            rating: row.rating,
            review_text: row.review_text,
            review_date: row.review_date,
            sentiment: row.sentiment,
            response_status: row.response_status,
            response_text: row.response_text,
            responded_at: row.responded_at,
        }
    }
}

/// Store new reviews for a location and refresh its response stats.
///
/// Reviews already stored under the same `(platform, external id)` are
/// skipped. The whole batch is validated before the first insert.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown location.
/// - [`EngineError::InvalidInput`] for a blank platform or any invalid review.
pub async fn ingest_reviews(
    ctx: &EngineContext,
    location: Uuid,
    platform: &str,
    reviews: &[IncomingReview],
) -> Result<IngestOutcome, EngineError> {
    let platform = check_batch(platform, reviews)?;
    let row = load_location(ctx, location).await?;
    store_reviews(ctx, &row, platform, reviews).await
}

pub(crate) fn check_batch<'a>(
    platform: &'a str,
    reviews: &[IncomingReview],
) -> Result<&'a str, EngineError> {
    let platform = platform.trim();
    if platform.is_empty() {
        return Err(EngineError::InvalidInput(
            "platform must not be empty".to_string(),
        ));
    }
    for review in reviews {
        review.validate()?;
    }
    Ok(platform)
}

pub(crate) async fn store_reviews(
    ctx: &EngineContext,
    row: &LocationRow,
    platform: &str,
    reviews: &[IncomingReview],
) -> Result<IngestOutcome, EngineError> {
    let mut newly_inserted = 0;
    for review in reviews {
        let new = NewReview {
            platform: platform.to_string(),
            external_review_id: review.key(platform).external_id(),
            reviewer_name: review.reviewer_name.clone(),
            rating: review.rating_i16(),
            review_text: review.text.clone(),
            review_date: review.reviewed_at,
            sentiment: review.sentiment().as_str().to_string(),
            metadata: if review.metadata.is_null() {
                serde_json::json!({})
            } else {
                review.metadata.clone()
            },
        };
        if locintel_db::insert_review_if_absent(&ctx.pool, row.id, &new).await? {
            newly_inserted += 1;
        }
    }

    let stats = refresh_stats(ctx, row.id, platform).await?;
    let outcome = IngestOutcome {
        found_total: reviews.len(),
        newly_inserted,
        skipped_existing: reviews.len() - newly_inserted,
        response_rate: stats,
    };
    tracing::info!(
        location = %row.public_id,
        platform,
        found = outcome.found_total,
        inserted = outcome.newly_inserted,
        "reviews ingested"
    );
    Ok(outcome)
}

async fn refresh_stats(
    ctx: &EngineContext,
    location_id: i64,
    platform: &str,
) -> Result<f64, EngineError> {
    let (total, responded) =
        locintel_db::count_review_responses(&ctx.pool, location_id, platform).await?;
    let rate = response_rate(responded, total);
    let stats = ReviewStatsRow {
        location_id,
        platform: platform.to_string(),
        total_reviews: i32::try_from(total).unwrap_or(i32::MAX),
        responded_count: i32::try_from(responded).unwrap_or(i32::MAX),
        response_rate: f64_to_decimal(rate, 4).unwrap_or_default(),
        computed_at: ctx.now(),
    };
    locintel_db::upsert_review_stats(&ctx.pool, &stats).await?;
    Ok(rate)
}

/// Record a reply to a stored review and refresh the platform's stats.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown review and
/// [`EngineError::InvalidInput`] for an empty reply.
pub async fn record_review_response(
    ctx: &EngineContext,
    review: Uuid,
    response_text: &str,
) -> Result<ReviewView, EngineError> {
    let text = response_text.trim();
    if text.is_empty() {
        return Err(EngineError::InvalidInput(
            "response text must not be empty".to_string(),
        ));
    }

    let existing = locintel_db::get_review_by_public_id(&ctx.pool, review)
        .await?
        .ok_or_else(|| EngineError::not_found("review", review))?;
    let updated = locintel_db::mark_review_responded(&ctx.pool, existing.id, text, ctx.now())
        .await?
        .ok_or_else(|| EngineError::not_found("review", review))?;

    refresh_stats(ctx, updated.location_id, &updated.platform).await?;
    Ok(updated.into())
}

/// Most recent reviews of a location, newest first.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown location.
pub async fn list_reviews(
    ctx: &EngineContext,
    location: Uuid,
    limit: i64,
) -> Result<Vec<ReviewView>, EngineError> {
    let row = load_location(ctx, location).await?;
    let reviews = locintel_db::list_reviews_for_location(&ctx.pool, row.id, limit.clamp(1, 500)).await?;
    Ok(reviews.into_iter().map(ReviewView::from).collect())
}
