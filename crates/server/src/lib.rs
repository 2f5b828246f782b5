pub mod error;
pub mod routes;

use std::sync::Arc;

use store::{StatsReader, StatsStore};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub reader: StatsReader,
}

impl AppState {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self {
            reader: StatsReader::new(store),
        }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        self.reader.store()
    }
}

/// Install the fmt and Sentry layers for every workspace crate.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, prelude::*};
    use utils::sentry::sentry_layer;

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},store={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).expect("Failed to create tracing filter");
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .with(sentry_layer())
        .init();
}
