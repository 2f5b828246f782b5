use std::{
    collections::{HashMap, HashSet},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Batch, BatchReport, Command, StatsStore, StorageError};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

struct ExpiringHash {
    fields: HashMap<String, String>,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct Inner {
    sorted_sets: HashMap<String, HashMap<String, f64>>,
    hashes: HashMap<String, ExpiringHash>,
    // Insertion-ordered; membership is checked before pushing.
    sets: HashMap<String, Vec<String>>,
    failing_keys: HashSet<String>,
    unavailable: bool,
    closed: bool,
}

impl Inner {
    fn purge_expired(&mut self, now: Instant) {
        self.hashes
            .retain(|_, hash| hash.expires_at.is_none_or(|at| at > now));
    }

    fn holds_other_type(&self, key: &str, command: &Command) -> bool {
        let in_zset = self.sorted_sets.contains_key(key);
        let in_hash = self.hashes.contains_key(key);
        let in_set = self.sets.contains_key(key);
        match command {
            Command::ZIncrBy { .. } => in_hash || in_set,
            Command::HSet { .. } => in_zset || in_set,
            Command::SAdd { .. } => in_zset || in_hash,
            Command::Expire { .. } => false,
        }
    }

    fn apply(&mut self, command: Command, now: Instant) -> Result<(), String> {
        if self.failing_keys.contains(command.key()) {
            return Err(format!(
                "ERR injected failure for {} on {}",
                command.name(),
                command.key()
            ));
        }
        if self.holds_other_type(command.key(), &command) {
            return Err(WRONGTYPE.to_string());
        }

        match command {
            Command::ZIncrBy { key, member, delta } => {
                *self
                    .sorted_sets
                    .entry(key)
                    .or_default()
                    .entry(member)
                    .or_insert(0.0) += delta as f64;
            }
            Command::HSet { key, field, value } => {
                self.hashes
                    .entry(key)
                    .or_insert_with(|| ExpiringHash {
                        fields: HashMap::new(),
                        expires_at: None,
                    })
                    .fields
                    .insert(field, value);
            }
            Command::Expire { key, seconds } => {
                // EXPIRE on a missing key is a no-op, not an error.
                if let Some(hash) = self.hashes.get_mut(&key) {
                    let ttl = Duration::from_secs(seconds.max(0) as u64);
                    hash.expires_at = Some(now + ttl);
                }
            }
            Command::SAdd { key, member } => {
                let members = self.sets.entry(key).or_default();
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
        Ok(())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        if self.unavailable {
            return Err(StorageError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// In-process store with the ordering and expiry semantics of Redis.
///
/// Used for tests and local replays. Failures can be injected per key to
/// exercise partial batch application.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later command touching `key` reports an error; the rest of its batch still applies.
    pub async fn fail_commands_on(&self, key: &str) {
        self.inner.lock().await.failing_keys.insert(key.to_string());
    }

    /// Simulate a lost connection: whole batches and reads fail.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().await.unavailable = unavailable;
    }

    /// Remaining time to live of a hash key, if it exists and has an expiry.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner.purge_expired(now);
        inner
            .hashes
            .get(key)
            .and_then(|hash| hash.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    pub async fn score(&self, key: &str, member: &str) -> Option<f64> {
        self.inner
            .lock()
            .await
            .sorted_sets
            .get(key)
            .and_then(|set| set.get(member).copied())
    }

    /// Every live key, sorted. Handy for asserting that nothing was written.
    pub async fn keys(&self) -> Vec<String> {
        let mut inner = self.inner.lock().await;
        inner.purge_expired(Instant::now());
        let mut keys: Vec<String> = inner
            .sorted_sets
            .keys()
            .chain(inner.hashes.keys())
            .chain(inner.sets.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn exec(&self, batch: Batch) -> Result<BatchReport, StorageError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner.check_available()?;
        inner.purge_expired(now);

        let outcomes = batch
            .into_iter()
            .map(|command| inner.apply(command, now))
            .collect();
        Ok(BatchReport::new(outcomes))
    }

    async fn top_by_score(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, StorageError> {
        let inner = self.inner.lock().await;
        inner.check_available()?;

        let Some(set) = inner.sorted_sets.get(key) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(String, f64)> = set
            .iter()
            .filter(|(_, score)| **score >= 0.0)
            .map(|(member, score)| (member.clone(), *score))
            .collect();
        // Redis breaks score ties in reverse lexicographic order for ZREVRANGEBYSCORE.
        ranked.sort_by(|(a_member, a_score), (b_member, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| b_member.as_bytes().cmp(a_member.as_bytes()))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;
        inner.purge_expired(Instant::now());
        Ok(inner
            .hashes
            .get(key)
            .map(|hash| hash.fields.clone())
            .unwrap_or_default())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        let inner = self.inner.lock().await;
        inner.check_available()?;
        Ok(inner.sets.get(key).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.inner.lock().await.check_available()
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner.check_available()?;
        inner.sorted_sets.clear();
        inner.hashes.clear();
        inner.sets.clear();
        Ok(())
    }

    async fn close(&self) {
        self.inner.lock().await.closed = true;
    }
}
