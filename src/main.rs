use std::sync::Arc;

use marquee_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, CatalogStore, PgCatalogStore},
    routes::{create_router, AppState},
    services::providers::{CompletionProvider, OpenAiCompatibleProvider},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let timeout = config.request_timeout();

    let pool = create_pool(&config.database_url, timeout).await?;
    let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool, timeout));

    let cache = match &config.redis_url {
        Some(url) => {
            tracing::info!("Movie cache enabled");
            Some(Cache::new(create_redis_client(url)?, timeout))
        }
        None => {
            tracing::info!("REDIS_URL not set, movie cache disabled");
            None
        }
    };

    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiCompatibleProvider::new(
        config.llm_api_key.clone(),
        config.llm_api_url.clone(),
        config.llm_model.clone(),
        timeout,
    )?);

    let state = Arc::new(AppState::new(
        store,
        provider,
        cache,
        config.base_prompt_template.clone(),
        config.recommended_movies_limit(),
    ));

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        model = %config.llm_model,
        recommended_movies = config.recommended_movies_limit(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
