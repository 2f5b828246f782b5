//! Backing store for the chat aggregates.
//!
//! Writers go through [`StatsWriter`], readers through [`StatsReader`]; both talk
//! to a [`StatsStore`], which is either Redis or the in-process [`MemoryStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub mod batch;
pub mod keys;
pub mod memory;
pub mod models;
pub mod reader;
pub mod redis_store;
pub mod writer;

pub use batch::{Batch, BatchReport, Command};
pub use memory::MemoryStore;
pub use reader::StatsReader;
pub use redis_store::RedisStore;
pub use writer::StatsWriter;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
    #[error("{}", errors.join("\n"))]
    Partial { errors: Vec<String> },
    #[error("Store connection is closed")]
    Closed,
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Unexpected reply for {key}: {reason}")]
    UnexpectedReply { key: String, reason: String },
}

/// The narrow command surface the aggregates need from a sorted-set/hash/set store.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Submit every command of `batch` in one round trip, without atomicity.
    /// `Err` means the batch as a whole could not be delivered.
    async fn exec(&self, batch: Batch) -> Result<BatchReport, StorageError>;

    /// Members of a sorted set with score >= 0, highest score first.
    async fn top_by_score(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, StorageError>;

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StorageError>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError>;

    async fn ping(&self) -> Result<(), StorageError>;

    /// Remove every key under this store's namespace.
    async fn clear(&self) -> Result<(), StorageError>;

    /// Release the connection. Later calls fail with [`StorageError::Closed`].
    async fn close(&self);
}
