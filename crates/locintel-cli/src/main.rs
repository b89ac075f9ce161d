mod audit;
mod location;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::audit::AuditCommands;
use crate::location::{KeywordCommands, LocationCommands};

#[derive(Debug, Parser)]
#[command(name = "locintel-cli")]
#[command(about = "Location intelligence command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Register and inspect locations
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
    /// Manage tracked search phrases
    Keyword {
        #[command(subcommand)]
        command: KeywordCommands,
    },
    /// Run audits and show snapshot history
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },
    /// Pull listing profiles and reviews from the upstream source
    Sync {
        /// Restrict the sync to these locations (repeatable)
        #[arg(long = "location")]
        locations: Vec<uuid::Uuid>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("locintel-cli: no command given; see --help");
        return Ok(());
    };

    let config = locintel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = locintel_db::PoolConfig::from_app_config(&config);
    let pool = locintel_db::connect_pool(&config.database_url, pool_config).await?;
    let ctx = locintel_engine::EngineContext::new(pool);

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            locintel_db::health_check(&ctx.pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            locintel_db::run_migrations(&ctx.pool).await?;
            println!("migrations applied");
        }
        Commands::Location { command } => location::run_location(&ctx, command).await?,
        Commands::Keyword { command } => location::run_keyword(&ctx, command).await?,
        Commands::Audit { command } => audit::run_audit(&ctx, &config, command).await?,
        Commands::Sync { locations } => audit::run_sync(&ctx, &config, locations).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
