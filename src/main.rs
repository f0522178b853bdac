use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use filmgraph::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle},
    store::{MemoryStore, PgStore, Repositories},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filmgraph=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let repositories = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL store");
            Repositories::from_store(Arc::new(PgStore::new(pool)))
        }
        None => {
            tracing::info!(
                seed_users = config.seed_users,
                seed_films = config.seed_films,
                "DATABASE_URL not set, using in-memory store"
            );
            Repositories::from_store(Arc::new(MemoryStore::with_catalog(
                1..=config.seed_users,
                1..=config.seed_films,
            )))
        }
    };

    let (cache, cache_handle): (Option<Cache>, Option<CacheWriterHandle>) = match &config.redis_url
    {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (cache, handle) = Cache::new(client).await;
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let state = AppState::new(repositories, cache, config.recommendation_settings());
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
