//! Audit and upstream sync command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use locintel_core::{AppConfig, AuditType};
use locintel_engine::{AuditRequest, AuditSnapshot, EngineContext, ListingSource};
use uuid::Uuid;

/// Sub-commands available under `audit`.
#[derive(Debug, Subcommand)]
pub enum AuditCommands {
    /// Run an on-demand audit for one location
    Run {
        #[arg(long)]
        location: Uuid,
        /// JSON file with scores, profile, keyword ranks, reviews, and notes
        #[arg(long)]
        request: Option<PathBuf>,
    },
    /// Fetch and audit every location, as the scheduled job does
    Periodic,
    /// Show recent audit snapshots, newest first
    History {
        #[arg(long)]
        location: Uuid,
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

/// Build the upstream source or explain why one is required.
fn listing_source(config: &AppConfig) -> anyhow::Result<Arc<dyn ListingSource>> {
    let client = locintel_places::PlacesClient::from_app_config(config)?.ok_or_else(|| {
        anyhow::anyhow!("GOOGLE_PLACES_API_KEY is not set; cannot reach the listing source")
    })?;
    Ok(Arc::new(client))
}

pub(crate) fn read_request(path: Option<&std::path::Path>) -> anyhow::Result<AuditRequest> {
    let Some(path) = path else {
        return Ok(AuditRequest::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid audit request in {}: {e}", path.display()))
}

fn print_snapshot(snapshot: &AuditSnapshot) {
    let avg = snapshot
        .average_keyword_rank
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let score = snapshot
        .local_seo_score
        .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
    println!(
        "{}  {:<10} score {:<7} keywords {} (top3 {}, top10 {}, avg {})",
        snapshot.audit_date,
        snapshot.audit_type,
        score,
        snapshot.total_keywords_tracked,
        snapshot.keywords_ranking_top_3,
        snapshot.keywords_ranking_top_10,
        avg
    );
}

pub(crate) async fn run_audit(
    ctx: &EngineContext,
    config: &AppConfig,
    command: AuditCommands,
) -> anyhow::Result<()> {
    match command {
        AuditCommands::Run { location, request } => {
            let request = read_request(request.as_deref())?;
            let snapshot =
                locintel_engine::run_full_audit(ctx, location, AuditType::OnDemand, &request)
                    .await?;
            print_snapshot(&snapshot);
            if snapshot.provenance().is_some_and(|p| !p.complete()) {
                println!("warning: some audit steps failed; see data_sources");
                println!("{}", serde_json::to_string_pretty(&snapshot.data_sources)?);
            }
        }
        AuditCommands::Periodic => {
            let source = listing_source(config)?;
            let report = locintel_engine::run_periodic_audits(
                ctx,
                source,
                config.sync_max_concurrent_locations,
            )
            .await?;
            for failure in &report.failed {
                println!("failed {}: {}", failure.location_id, failure.error);
            }
            println!(
                "audited {} locations, {} failed",
                report.succeeded.len(),
                report.failed.len()
            );
        }
        AuditCommands::History { location, limit } => {
            let snapshots = locintel_engine::list_audit_snapshots(ctx, location, limit).await?;
            if snapshots.is_empty() {
                println!("no audits recorded; run `audit run` first");
            }
            for snapshot in &snapshots {
                print_snapshot(snapshot);
            }
        }
    }
    Ok(())
}

pub(crate) async fn run_sync(
    ctx: &EngineContext,
    config: &AppConfig,
    locations: Vec<Uuid>,
) -> anyhow::Result<()> {
    let source = listing_source(config)?;
    let filter = (!locations.is_empty()).then_some(locations);
    let report = locintel_engine::sync_locations(
        ctx,
        source,
        filter,
        config.sync_max_concurrent_locations,
    )
    .await?;

    for outcome in &report.succeeded {
        let inserted = outcome.reviews.as_ref().map_or(0, |r| r.newly_inserted);
        let completeness = outcome
            .listing
            .as_ref()
            .map_or_else(|| "-".to_string(), |l| l.listing_completeness.to_string());
        println!(
            "{} ({}): {inserted} new reviews, listing {completeness}%",
            outcome.location_id, outcome.place_id
        );
        for error in &outcome.errors {
            println!("  warning: {error}");
        }
    }
    for failure in &report.failed {
        println!("failed {}: {}", failure.location_id, failure.error);
    }
    println!(
        "synced {} locations, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );
    Ok(())
}
