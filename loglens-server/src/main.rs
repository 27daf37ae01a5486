use loglens_core::domain::time::local_offset_description;
use loglens_server::{
    api::{self, AppState},
    config::Config,
    db,
    repository::PgLogStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loglens_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LogLens...");

    let config = Config::from_env()?;
    config.validate()?;

    // Stored timestamps carry no offset; everything is read in this frame
    tracing::warn!(
        "Interpreting all log timestamps as server-local time (UTC{})",
        local_offset_description()
    );

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config).await?;

    tracing::info!(
        "Database connection pool created (source={}, query_timeout={:?})",
        config.log_source.as_str(),
        config.query_timeout
    );

    let store = PgLogStore::new(pool, config.log_source, config.query_timeout);

    // Build router with all API endpoints
    let app = api::create_router(AppState::new(store));

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
