mod api;
mod middleware;

use std::sync::Arc;

use locintel_engine::{EngineContext, ListingSource};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = locintel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = locintel_db::PoolConfig::from_app_config(&config);
    let pool = locintel_db::connect_pool(&config.database_url, pool_config).await?;
    locintel_db::run_migrations(&pool).await?;

    let source: Option<Arc<dyn ListingSource>> =
        match locintel_places::PlacesClient::from_app_config(&config)? {
            Some(client) => Some(Arc::new(client)),
            None => {
                tracing::warn!("GOOGLE_PLACES_API_KEY not set; upstream listing sync disabled");
                None
            }
        };

    let state = AppState {
        ctx: EngineContext::new(pool),
        source,
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        locintel_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
