use std::sync::Arc;

use anyhow::Context;
use server::{AppState, init_tracing, routes};
use services::services::config::Config;
use store::RedisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _sentry = utils::sentry::init_once();
    init_tracing();

    let config = Config::from_env()?;
    let store = RedisStore::connect(&config.redis_url, config.redis_namespace.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", config.redis_url))?;

    let app_router = routes::router(AppState::new(Arc::new(store)));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let actual_port = listener.local_addr()?.port();
    tracing::info!("Server running on http://{}:{}", config.host, actual_port);

    axum::serve(listener, app_router).await?;
    Ok(())
}
