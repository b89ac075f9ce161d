//! Append-only audit snapshots in `location_audit_snapshots`.
//!
//! Rows are never updated; a trigger rejects any `UPDATE`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Input record for one snapshot. Score and listing fields are copied
/// verbatim from the location row read just before the insert.
#[derive(Debug, Clone)]
pub struct NewAuditSnapshot {
    pub location_id: i64,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub audit_date: NaiveDate,
    pub audit_type: String,
    pub local_seo_score: Option<Decimal>,
    pub citation_score: Option<Decimal>,
    pub review_score: Option<Decimal>,
    pub visibility_score: Option<Decimal>,
    pub optimization_score: Option<Decimal>,
    pub google_rating: Option<Decimal>,
    pub google_review_count: i32,
    pub listing_completeness: Option<i16>,
    pub total_keywords_tracked: i32,
    pub keywords_ranking_top_3: i32,
    pub keywords_ranking_top_10: i32,
    pub average_keyword_rank: Option<Decimal>,
    pub issues_found: Vec<String>,
    pub recommendations: Vec<String>,
    pub improvements_made: String,
    pub internal_notes: Option<String>,
    pub ai_insight: Option<String>,
    pub data_sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A row from the `location_audit_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditSnapshotRow {
    pub id: i64,
    pub public_id: Uuid,
    pub location_id: i64,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub audit_date: NaiveDate,
    pub audit_type: String,
    pub local_seo_score: Option<Decimal>,
    pub citation_score: Option<Decimal>,
    pub review_score: Option<Decimal>,
    pub visibility_score: Option<Decimal>,
    pub optimization_score: Option<Decimal>,
    pub google_rating: Option<Decimal>,
    pub google_review_count: i32,
    pub listing_completeness: Option<i16>,
    pub total_keywords_tracked: i32,
    pub keywords_ranking_top_3: i32,
    pub keywords_ranking_top_10: i32,
    pub average_keyword_rank: Option<Decimal>,
    pub issues_found: Vec<String>,
    pub recommendations: Vec<String>,
    pub improvements_made: String,
    pub internal_notes: Option<String>,
    pub ai_insight: Option<String>,
    pub data_sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

const SNAPSHOT_COLUMNS: &str = "id, public_id, location_id, client_id, agency_id, audit_date, \
     audit_type, local_seo_score, citation_score, review_score, visibility_score, \
     optimization_score, google_rating, google_review_count, listing_completeness, \
     total_keywords_tracked, keywords_ranking_top_3, keywords_ranking_top_10, \
     average_keyword_rank, issues_found, recommendations, improvements_made, \
     internal_notes, ai_insight, data_sources, created_at";

/// Append a snapshot and return the stored row.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails.
pub async fn insert_audit_snapshot(
    pool: &PgPool,
    snapshot: &NewAuditSnapshot,
) -> Result<AuditSnapshotRow, sqlx::Error> {
    sqlx::query_as::<_, AuditSnapshotRow>(&format!(
        "INSERT INTO location_audit_snapshots \
             (location_id, client_id, agency_id, audit_date, audit_type, \
              local_seo_score, citation_score, review_score, visibility_score, \
              optimization_score, google_rating, google_review_count, listing_completeness, \
              total_keywords_tracked, keywords_ranking_top_3, keywords_ranking_top_10, \
              average_keyword_rank, issues_found, recommendations, improvements_made, \
              internal_notes, ai_insight, data_sources, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20, $21, $22, $23, $24) \
         RETURNING {SNAPSHOT_COLUMNS}"
    ))
    .bind(snapshot.location_id)
    .bind(snapshot.client_id)
    .bind(snapshot.agency_id)
    .bind(snapshot.audit_date)
    .bind(&snapshot.audit_type)
    .bind(snapshot.local_seo_score)
    .bind(snapshot.citation_score)
    .bind(snapshot.review_score)
    .bind(snapshot.visibility_score)
    .bind(snapshot.optimization_score)
    .bind(snapshot.google_rating)
    .bind(snapshot.google_review_count)
    .bind(snapshot.listing_completeness)
    .bind(snapshot.total_keywords_tracked)
    .bind(snapshot.keywords_ranking_top_3)
    .bind(snapshot.keywords_ranking_top_10)
    .bind(snapshot.average_keyword_rank)
    .bind(&snapshot.issues_found)
    .bind(&snapshot.recommendations)
    .bind(&snapshot.improvements_made)
    .bind(&snapshot.internal_notes)
    .bind(&snapshot.ai_insight)
    .bind(&snapshot.data_sources)
    .bind(snapshot.created_at)
    .fetch_one(pool)
    .await
}

/// Snapshots of a location, newest first.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_audit_snapshots(
    pool: &PgPool,
    location_id: i64,
    limit: i64,
) -> Result<Vec<AuditSnapshotRow>, sqlx::Error> {
    sqlx::query_as::<_, AuditSnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM location_audit_snapshots \
         WHERE location_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(location_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
