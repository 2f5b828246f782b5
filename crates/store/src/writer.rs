use std::sync::Arc;

use crate::{
    Batch, StatsStore, StorageError,
    keys::{
        BUCKET_TTL_SECONDS, FAILED_MESSAGES_KEY, MESSAGES_PER_SECOND_FIELD, NICKS_KEY, ROOMS_KEY,
        WORDS_KEY, messages_per_second_key,
    },
    models::MessagesPerSecond,
};

/// Write side of the aggregates. Every operation is a single non-atomic batch.
#[derive(Clone)]
pub struct StatsWriter {
    store: Arc<dyn StatsStore>,
}

impl StatsWriter {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    /// Count one chat message. Blank rooms and nicks are skipped; words are
    /// counted as given, empty tokens included.
    pub async fn record_message<S: AsRef<str>>(
        &self,
        room: &str,
        nick: &str,
        words: &[S],
    ) -> Result<(), StorageError> {
        let mut batch = Batch::new();
        if !room.trim().is_empty() {
            batch.zincrby(ROOMS_KEY, room, 1);
        }
        if !nick.trim().is_empty() {
            batch.zincrby(NICKS_KEY, nick, 1);
        }
        for word in words {
            batch.zincrby(WORDS_KEY, word.as_ref(), 1);
        }

        if batch.is_empty() {
            return Ok(());
        }
        self.store.exec(batch).await?.into_result()
    }

    /// Persist a completed one-second window. Never fails: when the bucket
    /// cannot be written, the payload is quarantined in the failed-messages set.
    pub async fn record_window(&self, second: i64, count: u64) {
        let key = messages_per_second_key(second);
        let payload = MessagesPerSecond {
            messages_per_second: count,
        };

        let mut batch = Batch::new();
        batch
            .hset(&key, MESSAGES_PER_SECOND_FIELD, count.to_string())
            .expire(&key, BUCKET_TTL_SECONDS);

        let result = match self.store.exec(batch).await {
            Ok(report) => report.into_result(),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to write window {}: {}", key, e);
            let raw = match serde_json::to_string(&payload) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!("Failed to encode window payload for {}: {}", key, e);
                    return;
                }
            };
            if let Err(e) = self.record_failure(&raw).await {
                tracing::error!("Failed to quarantine window {}: {}", key, e);
            }
        }
    }

    /// Quarantine raw text. Repeats collapse into one entry.
    pub async fn record_failure(&self, raw: &str) -> Result<(), StorageError> {
        let mut batch = Batch::new();
        batch.sadd(FAILED_MESSAGES_KEY, raw);
        self.store.exec(batch).await?.into_result()
    }
}
