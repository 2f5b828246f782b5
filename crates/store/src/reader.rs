use std::sync::Arc;

use utils::time::seconds_since_epoch;

use crate::{
    StatsStore, StorageError,
    keys::{
        FAILED_MESSAGES_KEY, MESSAGES_PER_SECOND_FIELD, NICKS_KEY, ROOMS_KEY, WORDS_KEY,
        messages_per_second_key,
    },
    models::{MessagesPerSecond, RankedEntry},
};

pub const TOP_LIMIT: usize = 10;

/// Read side of the aggregates, as served to dashboards.
#[derive(Clone)]
pub struct StatsReader {
    store: Arc<dyn StatsStore>,
}

impl StatsReader {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    pub async fn top(&self, key: &str, limit: usize) -> Result<Vec<RankedEntry>, StorageError> {
        let ranked = self.store.top_by_score(key, limit).await?;
        Ok(ranked
            .into_iter()
            .map(|(member, score)| RankedEntry::new(member, score as u64))
            .collect())
    }

    pub async fn top_rooms(&self) -> Result<Vec<RankedEntry>, StorageError> {
        self.top(ROOMS_KEY, TOP_LIMIT).await
    }

    pub async fn top_nicks(&self) -> Result<Vec<RankedEntry>, StorageError> {
        self.top(NICKS_KEY, TOP_LIMIT).await
    }

    pub async fn top_words(&self) -> Result<Vec<RankedEntry>, StorageError> {
        self.top(WORDS_KEY, TOP_LIMIT).await
    }

    /// Throughput recorded for `second`; zero when the bucket expired or was never written.
    pub async fn messages_per_second_at(
        &self,
        second: i64,
    ) -> Result<MessagesPerSecond, StorageError> {
        let key = messages_per_second_key(second);
        let bucket = self.store.hash_get_all(&key).await?;
        let messages_per_second = match bucket.get(MESSAGES_PER_SECOND_FIELD) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| StorageError::UnexpectedReply {
                    key,
                    reason: format!("{raw:?} is not a count: {e}"),
                })?,
            None => 0,
        };
        Ok(MessagesPerSecond {
            messages_per_second,
        })
    }

    pub async fn messages_per_second(&self) -> Result<MessagesPerSecond, StorageError> {
        self.messages_per_second_at(seconds_since_epoch()).await
    }

    pub async fn failed_messages(&self) -> Result<Vec<String>, StorageError> {
        self.store.set_members(FAILED_MESSAGES_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Batch, MemoryStore};

    async fn seeded() -> (Arc<MemoryStore>, StatsReader) {
        let store = Arc::new(MemoryStore::new());
        let mut batch = Batch::new();
        for i in 0..12 {
            batch.zincrby(WORDS_KEY, &format!("w{i:02}"), i + 1);
        }
        batch.hset(
            &messages_per_second_key(100),
            MESSAGES_PER_SECOND_FIELD,
            "9",
        );
        store.exec(batch).await.unwrap().into_result().unwrap();
        (store.clone(), StatsReader::new(store))
    }

    #[tokio::test]
    async fn top_words_is_limited_and_descending() {
        let (_, reader) = seeded().await;
        let top = reader.top_words().await.unwrap();

        assert_eq!(top.len(), TOP_LIMIT);
        assert_eq!(top[0], RankedEntry::new("w11", 12));
        assert_eq!(top[9], RankedEntry::new("w02", 3));
        assert!(top.windows(2).all(|pair| pair[0].count >= pair[1].count));
    }

    #[tokio::test]
    async fn missing_sets_read_as_empty() {
        let (_, reader) = seeded().await;
        assert!(reader.top_rooms().await.unwrap().is_empty());
        assert!(reader.top_nicks().await.unwrap().is_empty());
        assert!(reader.failed_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bucket_reads_count_or_zero() {
        let (_, reader) = seeded().await;
        assert_eq!(
            reader.messages_per_second_at(100).await.unwrap(),
            MessagesPerSecond {
                messages_per_second: 9
            }
        );
        assert_eq!(
            reader.messages_per_second_at(101).await.unwrap(),
            MessagesPerSecond::default()
        );
    }

    #[tokio::test]
    async fn garbage_bucket_value_is_an_error() {
        let (store, reader) = seeded().await;
        let mut batch = Batch::new();
        batch.hset(
            &messages_per_second_key(200),
            MESSAGES_PER_SECOND_FIELD,
            "lots",
        );
        store.exec(batch).await.unwrap().into_result().unwrap();

        assert!(matches!(
            reader.messages_per_second_at(200).await,
            Err(StorageError::UnexpectedReply { .. })
        ));
    }
}
