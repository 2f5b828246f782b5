use std::sync::Arc;

use anyhow::Context;
use server::init_tracing;
use services::services::{config::Config, worker::MessageWorker};
use store::RedisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _sentry = utils::sentry::init_once();
    init_tracing();

    let config = Config::from_env()?;
    let locator = config.chat_interface_url()?;
    let store = RedisStore::connect(&config.redis_url, config.redis_namespace.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", config.redis_url))?;

    let mut worker = MessageWorker::new(Arc::new(store), config.worker_mode)?;
    let result = worker.run(locator).await;
    worker.close().await;

    match result {
        Ok(summary) => {
            tracing::info!("Worker finished: {:?}", summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Worker stopped: {}", e);
            Err(e.into())
        }
    }
}
