use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pathfinder_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, CachedRecordStore, PgRecordStore, RecordStore},
    routes::{create_router, AppState},
    services::{CompletionClient, CompletionGateway, GroqClient},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pathfinder_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let records: Arc<dyn RecordStore> = Arc::new(CachedRecordStore::new(
        Arc::new(PgRecordStore::new(pool)),
        cache,
        config.record_cache_ttl_secs,
    ));

    let client: Arc<dyn CompletionClient> = Arc::new(GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_api_url.clone(),
        config.groq_model.clone(),
        config.completion_max_tokens,
        config.completion_timeout(),
    ));
    let gateway = CompletionGateway::with_retry(
        client,
        config.completion_max_attempts,
        config.completion_base_delay(),
    );

    let app = create_router(AppState::new(gateway, records), &config.cors_origins);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        model = %config.groq_model,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
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
