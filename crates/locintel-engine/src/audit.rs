//! Full audit runs and the append-only snapshot log.

use chrono::{DateTime, NaiveDate, Utc};
use locintel_core::{
    aggregate_keyword_ranks, AuditType, ComponentScores, IncomingReview, ProfileSnapshot,
    Provenance,
};
use locintel_db::{decimal_to_f64, f64_to_decimal, AuditSnapshotRow, LocationRow, NewAuditSnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keywords::{apply_readings, parse_readings, KeywordRankInput};
use crate::listing::{apply_listing, check_profile};
use crate::locations::{load_location, reload_location};
use crate::reviews::{check_batch, store_reviews};
use crate::scores::{apply_scores, check_scoreable};
use crate::{EngineContext, EngineError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewBatch {
    pub platform: String,
    pub reviews: Vec<IncomingReview>,
}

/// Free-text fields copied onto the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuditNotes {
    pub issues_found: Vec<String>,
    pub recommendations: Vec<String>,
    pub improvements_made: String,
    /// Agency-only; stripped by [`AuditSnapshot::for_business_owner`].
    pub internal_notes: Option<String>,
    pub ai_insight: Option<String>,
}

/// Everything one audit run may update. Omitted facets are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuditRequest {
    #[serde(default)]
    pub scores: Option<ComponentScores>,
    #[serde(default)]
    pub profile: Option<ProfileSnapshot>,
    #[serde(default)]
    pub keywords: Option<Vec<KeywordRankInput>>,
    #[serde(default)]
    pub reviews: Option<ReviewBatch>,
    #[serde(flatten)]
    pub notes: AuditNotes,
}

/// A stored audit snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSnapshot {
    pub id: Uuid,
    pub location_id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
    pub audit_date: NaiveDate,
    pub audit_type: String,
    pub local_seo_score: Option<f64>,
    pub citation_score: Option<f64>,
    pub review_score: Option<f64>,
    pub visibility_score: Option<f64>,
    pub optimization_score: Option<f64>,
    pub google_rating: Option<f64>,
    pub google_review_count: i32,
    pub listing_completeness: Option<i16>,
    pub total_keywords_tracked: i32,
    pub keywords_ranking_top_3: i32,
    pub keywords_ranking_top_10: i32,
    pub average_keyword_rank: Option<f64>,
    pub issues_found: Vec<String>,
    pub recommendations: Vec<String>,
    pub improvements_made: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
    pub ai_insight: Option<String>,
    pub data_sources: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditSnapshot {
    fn from_row(row: AuditSnapshotRow, location: Uuid) -> Self {
        Self {
            id: row.public_id,
            location_id: location,
            client_id: row.client_id,
            agency_id: row.agency_id,
            audit_date: row.audit_date,
            audit_type: row.audit_type,
            local_seo_score: row.local_seo_score.map(decimal_to_f64),
            citation_score: row.citation_score.map(decimal_to_f64),
            review_score: row.review_score.map(decimal_to_f64),
            visibility_score: row.visibility_score.map(decimal_to_f64),
            optimization_score: row.optimization_score.map(decimal_to_f64),
            google_rating: row.google_rating.map(decimal_to_f64),
            google_review_count: row.google_review_count,
            listing_completeness: row.listing_completeness,
            total_keywords_tracked: row.total_keywords_tracked,
            keywords_ranking_top_3: row.keywords_ranking_top_3,
            keywords_ranking_top_10: row.keywords_ranking_top_10,
            average_keyword_rank: row.average_keyword_rank.map(decimal_to_f64),
            issues_found: row.issues_found,
            recommendations: row.recommendations,
            improvements_made: row.improvements_made,
            internal_notes: row.internal_notes,
            ai_insight: row.ai_insight,
            data_sources: row.data_sources,
            created_at: row.created_at,
        }
    }

    /// Provenance recorded with the snapshot, if it parses.
    #[must_use]
    pub fn provenance(&self) -> Option<Provenance> {
        serde_json::from_value(self.data_sources.clone()).ok()
    }

    /// The snapshot without agency-only fields.
    #[must_use]
    pub fn for_business_owner(mut self) -> Self {
        self.internal_notes = None;
        self
    }
}

/// Apply every requested update, then append a snapshot of the result.
///
/// The whole request is validated before the first write. After that, a
/// failing step is logged and recorded as `false` in the snapshot's
/// provenance; later steps still run.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown location.
/// - [`EngineError::InvalidInput`] if any part of the request is invalid.
/// - [`EngineError::Storage`] if the snapshot itself cannot be written.
pub async fn run_full_audit(
    ctx: &EngineContext,
    location: Uuid,
    audit_type: AuditType,
    request: &AuditRequest,
) -> Result<AuditSnapshot, EngineError> {
    let row = load_location(ctx, location).await?;
    run_audit_for(ctx, row, audit_type, request, None).await
}

pub(crate) async fn run_audit_for(
    ctx: &EngineContext,
    row: LocationRow,
    audit_type: AuditType,
    request: &AuditRequest,
    upstream_fetch: Option<bool>,
) -> Result<AuditSnapshot, EngineError> {
    if let Some(scores) = &request.scores {
        check_scoreable(scores, &row.component_scores())?;
    }
    if let Some(profile) = &request.profile {
        check_profile(profile)?;
    }
    let readings = request
        .keywords
        .as_deref()
        .map(parse_readings)
        .transpose()?;
    let platform = request
        .reviews
        .as_ref()
        .map(|batch| check_batch(&batch.platform, &batch.reviews))
        .transpose()?;

    let mut provenance = Provenance::new(audit_type, ctx.now());
    provenance.upstream_fetch = upstream_fetch;

    if let Some(scores) = &request.scores {
        let result = apply_scores(ctx, row.clone(), scores).await;
        provenance.scores = Some(step_ok(&row, "scores", result));
    }
    if let Some(profile) = &request.profile {
        let result = apply_listing(ctx, &row, profile).await;
        provenance.listing_profile = Some(step_ok(&row, "listing_profile", result));
    }
    if let Some(readings) = &readings {
        let result = apply_readings(ctx, &row, readings).await;
        provenance.keywords = Some(step_ok(&row, "keywords", result));
    }
    if let (Some(batch), Some(platform)) = (&request.reviews, platform) {
        let result = store_reviews(ctx, &row, platform, &batch.reviews).await;
        provenance.reviews = Some(step_ok(&row, "reviews", result));
    }

    let current = reload_location(ctx, &row).await?;
    let tracked = locintel_db::list_tracked_keywords(&ctx.pool, current.id).await?;
    let aggregate = aggregate_keyword_ranks(tracked.iter().map(|k| k.current_rank));

    let data_sources = serde_json::to_value(&provenance).unwrap_or_default();
    let notes = &request.notes;
    let snapshot = NewAuditSnapshot {
        location_id: current.id,
        client_id: current.client_id,
        agency_id: current.agency_id,
        audit_date: provenance.recorded_at.date_naive(),
        audit_type: audit_type.as_str().to_string(),
        local_seo_score: current.local_seo_score,
        citation_score: current.citation_score,
        review_score: current.review_score,
        visibility_score: current.visibility_score,
        optimization_score: current.optimization_score,
        google_rating: current.google_rating,
        google_review_count: current.google_review_count,
        listing_completeness: current.listing_completeness,
        total_keywords_tracked: aggregate.total_tracked,
        keywords_ranking_top_3: aggregate.top_3,
        keywords_ranking_top_10: aggregate.top_10,
        average_keyword_rank: aggregate.average_rank.and_then(|avg| f64_to_decimal(avg, 1)),
        issues_found: notes.issues_found.clone(),
        recommendations: notes.recommendations.clone(),
        improvements_made: notes.improvements_made.clone(),
        internal_notes: notes.internal_notes.clone(),
        ai_insight: notes.ai_insight.clone(),
        data_sources,
        created_at: provenance.recorded_at,
    };

    let stored = locintel_db::insert_audit_snapshot(&ctx.pool, &snapshot).await?;
    tracing::info!(
        location = %current.public_id,
        audit_type = %audit_type,
        complete = provenance.complete(),
        "audit snapshot written"
    );
    Ok(AuditSnapshot::from_row(stored, current.public_id))
}

fn step_ok<T>(row: &LocationRow, step: &'static str, result: Result<T, EngineError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(location = %row.public_id, step, error = %e, "audit step failed");
            false
        }
    }
}

/// Snapshots of a location, newest first.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown location.
pub async fn list_audit_snapshots(
    ctx: &EngineContext,
    location: Uuid,
    limit: i64,
) -> Result<Vec<AuditSnapshot>, EngineError> {
    let row = load_location(ctx, location).await?;
    let rows = locintel_db::list_audit_snapshots(&ctx.pool, row.id, limit.clamp(1, 200)).await?;
    Ok(rows
        .into_iter()
        .map(|r| AuditSnapshot::from_row(r, row.public_id))
        .collect())
}
