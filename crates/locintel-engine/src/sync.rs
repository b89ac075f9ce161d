//! Upstream listing sync and bulk fan-out across locations.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use locintel_core::AuditType;
use locintel_db::LocationRow;
use serde::Serialize;
use uuid::Uuid;

use crate::audit::{run_audit_for, AuditRequest, AuditSnapshot, ReviewBatch};
use crate::listing::{apply_listing, contact_from_profile, ListingOutcome};
use crate::locations::load_location;
use crate::reviews::{check_batch, store_reviews, IngestOutcome};
use crate::source::{ListingFetch, ListingSource};
use crate::{EngineContext, EngineError};

/// Result of syncing one location from its upstream listing.
///
/// Reviews and the profile are separate failure units: either may be
/// `None` with the reason in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub location_id: Uuid,
    pub place_id: String,
    pub reviews: Option<IngestOutcome>,
    pub listing: Option<ListingOutcome>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationFailure {
    pub location_id: Uuid,
    pub error: String,
}

/// Per-location outcomes of a bulk run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkReport<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<LocationFailure>,
}

impl<T> Default for BulkReport<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Fetch a location's upstream listing and store its reviews, profile, and
/// any contact fields the location is missing.
///
/// A location without a place id is resolved by a text search on its name
/// and address, and the match is stored.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown location.
/// - [`EngineError::UpstreamUnavailable`] if the fetch fails; nothing is written.
pub async fn sync_location_listing(
    ctx: &EngineContext,
    source: &dyn ListingSource,
    location: Uuid,
) -> Result<SyncOutcome, EngineError> {
    let row = load_location(ctx, location).await?;
    let fetch = fetch_for(ctx, source, &row).await?;
    let mut outcome = SyncOutcome {
        location_id: row.public_id,
        place_id: fetch.place_id.clone(),
        reviews: None,
        listing: None,
        errors: Vec::new(),
    };

    let platform = source.platform();
    match check_batch(platform, &fetch.reviews) {
        Ok(platform) => match store_reviews(ctx, &row, platform, &fetch.reviews).await {
            Ok(ingest) => outcome.reviews = Some(ingest),
            Err(e) => outcome.errors.push(format!("reviews: {e}")),
        },
        Err(e) => outcome.errors.push(format!("reviews: {e}")),
    }

    match store_profile(ctx, &row, &fetch).await {
        Ok(listing) => outcome.listing = Some(listing),
        Err(e) => outcome.errors.push(format!("listing: {e}")),
    }

    for error in &outcome.errors {
        tracing::warn!(location = %row.public_id, error = %error, "listing sync step failed");
    }
    Ok(outcome)
}

async fn fetch_for(
    ctx: &EngineContext,
    source: &dyn ListingSource,
    row: &LocationRow,
) -> Result<ListingFetch, EngineError> {
    let place_id = match &row.google_place_id {
        Some(id) => id.clone(),
        None => {
            let query = match &row.address {
                Some(address) => format!("{} {address}", row.business_name),
                None => row.business_name.clone(),
            };
            let id = source.resolve_place_id(&query).await?;
            locintel_db::set_google_place_id(&ctx.pool, row.id, &id).await?;
            tracing::info!(location = %row.public_id, place_id = %id, "resolved place id");
            id
        }
    };
    source.fetch_listing(&place_id).await
}

async fn store_profile(
    ctx: &EngineContext,
    row: &LocationRow,
    fetch: &ListingFetch,
) -> Result<ListingOutcome, EngineError> {
    let listing = apply_listing(ctx, row, &fetch.profile).await?;
    locintel_db::backfill_location_contact(&ctx.pool, row.id, &contact_from_profile(&fetch.profile))
        .await?;
    Ok(listing)
}

/// Sync many locations, at most `max_concurrent` at a time.
///
/// `locations: None` syncs every location. Each location runs in its own
/// task; a failure or panic is reported for that location only.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] if the location list cannot be read.
pub async fn sync_locations(
    ctx: &EngineContext,
    source: Arc<dyn ListingSource>,
    locations: Option<Vec<Uuid>>,
    max_concurrent: usize,
) -> Result<BulkReport<SyncOutcome>, EngineError> {
    let ids = match locations {
        Some(ids) => ids,
        None => locintel_db::list_location_ids(&ctx.pool).await?,
    };
    let ctx = ctx.clone();
    Ok(fan_out(ids, max_concurrent, move |id| {
        let ctx = ctx.clone();
        let source = Arc::clone(&source);
        async move { sync_location_listing(&ctx, source.as_ref(), id).await }
    })
    .await)
}

/// Fetch every location's listing and write a periodic audit from it.
///
/// If the fetch fails the audit still runs, recording `upstream_fetch: false`.
///
/// # Errors
///
/// Returns [`EngineError::Storage`] if the location list cannot be read.
pub async fn run_periodic_audits(
    ctx: &EngineContext,
    source: Arc<dyn ListingSource>,
    max_concurrent: usize,
) -> Result<BulkReport<AuditSnapshot>, EngineError> {
    let ids = locintel_db::list_location_ids(&ctx.pool).await?;
    let ctx = ctx.clone();
    let report = fan_out(ids, max_concurrent, move |id| {
        let ctx = ctx.clone();
        let source = Arc::clone(&source);
        async move { periodic_audit(&ctx, source.as_ref(), id).await }
    })
    .await;
    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "periodic audits finished"
    );
    Ok(report)
}

async fn periodic_audit(
    ctx: &EngineContext,
    source: &dyn ListingSource,
    location: Uuid,
) -> Result<AuditSnapshot, EngineError> {
    let row = load_location(ctx, location).await?;
    let mut request = AuditRequest::default();

    let fetched = match fetch_for(ctx, source, &row).await {
        Ok(fetch) => {
            if let Err(e) = locintel_db::backfill_location_contact(
                &ctx.pool,
                row.id,
                &contact_from_profile(&fetch.profile),
            )
            .await
            {
                tracing::warn!(location = %row.public_id, error = %e, "contact backfill failed");
            }
            request.profile = Some(fetch.profile);
            request.reviews = Some(ReviewBatch {
                platform: source.platform().to_string(),
                reviews: fetch.reviews,
            });
            true
        }
        Err(e) => {
            tracing::warn!(location = %row.public_id, error = %e, "upstream fetch failed");
            false
        }
    };

    run_audit_for(ctx, row, AuditType::Periodic, &request, Some(fetched)).await
}

/// Run `task` for each id in its own tokio task, `max_concurrent` at a time.
async fn fan_out<T, F, Fut>(ids: Vec<Uuid>, max_concurrent: usize, task: F) -> BulkReport<T>
where
    T: Send + 'static,
    F: Fn(Uuid) -> Fut,
    Fut: Future<Output = Result<T, EngineError>> + Send + 'static,
{
    let results: Vec<(Uuid, Result<Result<T, EngineError>, tokio::task::JoinError>)> =
        stream::iter(ids)
            .map(|id| {
                let handle = tokio::spawn(task(id));
                async move { (id, handle.await) }
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;

    let mut report = BulkReport::default();
    for (id, result) in results {
        match result {
            Ok(Ok(value)) => report.succeeded.push(value),
            Ok(Err(e)) => {
                tracing::error!(location = %id, error = %e, "location task failed");
                report.failed.push(LocationFailure {
                    location_id: id,
                    error: e.to_string(),
                });
            }
            Err(join_err) => {
                tracing::error!(location = %id, error = %join_err, "location task panicked");
                report.failed.push(LocationFailure {
                    location_id: id,
                    error: format!("task panicked: {join_err}"),
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn ids(n: u128) -> Vec<Uuid> {
        (1..=n).map(Uuid::from_u128).collect()
    }

    #[tokio::test]
    async fn fan_out_isolates_failures_and_panics() {
        let report = fan_out(ids(5), 2, |id| async move {
            match id.as_u128() {
                2 => Err(EngineError::UpstreamUnavailable("timeout".to_string())),
                4 => panic!("boom"),
                n => Ok(n),
            }
        })
        .await;

        let mut ok = report.succeeded.clone();
        ok.sort_unstable();
        assert_eq!(ok, vec![1, 3, 5]);
        assert_eq!(report.failed.len(), 2);

        let panicked = report
            .failed
            .iter()
            .find(|f| f.location_id == Uuid::from_u128(4))
            .unwrap();
        assert!(panicked.error.contains("panicked"), "{}", panicked.error);
    }

    #[tokio::test]
    async fn fan_out_respects_concurrency_limit() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let report = fan_out(ids(8), 3, |_| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert_eq!(report.succeeded.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn fan_out_treats_zero_limit_as_one() {
        let report = fan_out(ids(2), 0, |_| async { Ok(()) }).await;
        assert_eq!(report.succeeded.len(), 2);
        assert!(report.failed.is_empty());
    }
}
