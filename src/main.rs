use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use ai_placeholder::{
    api::{self, AppState},
    cache::ResultCache,
    clock::{Clock, SystemClock},
    config::AppConfig,
    coordinator::GenerationCoordinator,
    generator::ChatCompletionsGenerator,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    if config.generator.api_key.is_none() {
        tracing::warn!("AI_API_KEY is not set; every generation will fail");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(ResultCache::new(clock.clone()));
    let generator = Arc::new(ChatCompletionsGenerator::new(config.generator.clone()));
    let coordinator = GenerationCoordinator::new(cache.clone(), generator, clock);

    let sweeper = cache.spawn_sweeper(config.cache_sweep_interval);
    let cleanup = coordinator.spawn_cleanup(config.stale_sweep_interval);

    let router = api::router(AppState {
        coordinator,
        refresh_after_secs: config.refresh_after_secs,
    });
    let tcp_listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    tracing::info!(
        address = %config.bind_address,
        model = %config.generator.model,
        "placeholder image server started"
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    sweeper.abort();
    cleanup.abort();
    tracing::info!("placeholder image server stopped");
    Ok(())
}
