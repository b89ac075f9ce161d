//! Location and keyword command handlers.

use clap::Subcommand;
use locintel_engine::{EngineContext, RegisterLocation};
use uuid::Uuid;

/// Sub-commands available under `location`.
#[derive(Debug, Subcommand)]
pub enum LocationCommands {
    /// Register a new location
    Add {
        #[arg(long)]
        client: Uuid,
        #[arg(long)]
        agency: Uuid,
        /// Business name as it appears on the listing
        #[arg(long)]
        name: String,
        /// Upstream place id; resolved from name and address on first sync when omitted
        #[arg(long)]
        place_id: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    /// Show a location with its latest scores and review stats
    Show {
        #[arg(long)]
        location: Uuid,
    },
}

/// Sub-commands available under `keyword`.
#[derive(Debug, Subcommand)]
pub enum KeywordCommands {
    /// Start tracking a search phrase
    Add {
        #[arg(long)]
        location: Uuid,
        #[arg(long)]
        keyword: String,
    },
    /// Stop tracking a search phrase; its history is kept
    Pause {
        #[arg(long)]
        location: Uuid,
        #[arg(long)]
        keyword: String,
    },
    /// List keywords with their current rank
    List {
        #[arg(long)]
        location: Uuid,
    },
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub(crate) async fn run_location(
    ctx: &EngineContext,
    command: LocationCommands,
) -> anyhow::Result<()> {
    match command {
        LocationCommands::Add {
            client,
            agency,
            name,
            place_id,
            address,
            phone,
            website,
        } => {
            let view = locintel_engine::register_location(
                ctx,
                RegisterLocation {
                    client_id: client,
                    agency_id: agency,
                    business_name: name,
                    google_place_id: place_id,
                    address,
                    phone,
                    website,
                },
            )
            .await?;
            println!("registered '{}' as {}", view.business_name, view.id);
        }
        LocationCommands::Show { location } => {
            let view = locintel_engine::get_location(ctx, location).await?;
            println!("{} ({})", view.business_name, view.id);
            println!("  place id:      {}", fmt_opt(view.google_place_id.as_deref()));
            println!("  address:       {}", fmt_opt(view.address.as_deref()));
            println!("  local SEO:     {}", fmt_opt(view.local_seo_score));
            println!(
                "  components:    citation {} / review {} / visibility {} / optimization {}",
                fmt_opt(view.scores.citation),
                fmt_opt(view.scores.review),
                fmt_opt(view.scores.visibility),
                fmt_opt(view.scores.optimization),
            );
            println!(
                "  listing:       {}% complete, rating {} from {} reviews",
                fmt_opt(view.listing_completeness),
                fmt_opt(view.google_rating),
                view.google_review_count
            );
            for stats in &view.review_stats {
                println!(
                    "  {:<14} {} reviews, {} responded ({:.1}%)",
                    stats.platform,
                    stats.total_reviews,
                    stats.responded_count,
                    stats.response_rate * 100.0
                );
            }
        }
    }
    Ok(())
}

pub(crate) async fn run_keyword(
    ctx: &EngineContext,
    command: KeywordCommands,
) -> anyhow::Result<()> {
    match command {
        KeywordCommands::Add { location, keyword } => {
            let view = locintel_engine::track_keyword(ctx, location, &keyword).await?;
            println!("tracking '{}'", view.keyword);
        }
        KeywordCommands::Pause { location, keyword } => {
            locintel_engine::set_keyword_tracking(ctx, location, &keyword, false).await?;
            println!("paused '{}'", keyword.trim());
        }
        KeywordCommands::List { location } => {
            let keywords = locintel_engine::list_keywords(ctx, location).await?;
            if keywords.is_empty() {
                println!("no keywords tracked; run `keyword add` first");
                return Ok(());
            }
            println!(
                "{:<32}{:<10}{:<9}{:<8}{:<6}{:<6}",
                "KEYWORD", "TRACKING", "CURRENT", "CHANGE", "BEST", "WORST"
            );
            for kw in &keywords {
                println!(
                    "{:<32}{:<10}{:<9}{:<8}{:<6}{:<6}",
                    kw.keyword,
                    if kw.is_tracking { "yes" } else { "no" },
                    fmt_opt(kw.current_rank),
                    fmt_opt(kw.rank_change),
                    fmt_opt(kw.best_rank),
                    fmt_opt(kw.worst_rank),
                );
            }
        }
    }
    Ok(())
}
