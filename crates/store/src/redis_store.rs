use std::collections::HashMap;

use async_trait::async_trait;
use redis::{Client, Cmd, Pipeline, Value, aio::MultiplexedConnection};
use tokio::sync::RwLock;

use crate::{Batch, BatchReport, Command, StatsStore, StorageError};

const SCAN_COUNT: usize = 100;

/// Redis-backed store over a single multiplexed connection.
///
/// Every key is prefixed with `namespace` here, so callers only ever deal with
/// the bare key names from [`crate::keys`].
pub struct RedisStore {
    namespace: String,
    connection: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self, StorageError> {
        let client = Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        let namespace = namespace.into();
        tracing::info!("Connected to redis (namespace {:?})", namespace);

        Ok(Self {
            namespace,
            connection: RwLock::new(Some(connection)),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StorageError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(StorageError::Closed)
    }

    fn to_cmd(&self, command: &Command) -> Cmd {
        let mut cmd = redis::cmd(command.name());
        match command {
            Command::ZIncrBy { key, member, delta } => {
                cmd.arg(self.key(key)).arg(*delta).arg(member);
            }
            Command::HSet { key, field, value } => {
                cmd.arg(self.key(key)).arg(field).arg(value);
            }
            Command::Expire { key, seconds } => {
                cmd.arg(self.key(key)).arg(*seconds);
            }
            Command::SAdd { key, member } => {
                cmd.arg(self.key(key)).arg(member);
            }
        }
        cmd
    }
}

fn describe_server_error(value: &Value) -> Option<String> {
    match value {
        Value::ServerError(err) => Some(match err.details() {
            Some(details) => format!("{} {}", err.code(), details),
            None => err.code().to_string(),
        }),
        _ => None,
    }
}

#[async_trait]
impl StatsStore for RedisStore {
    async fn exec(&self, batch: Batch) -> Result<BatchReport, StorageError> {
        if batch.is_empty() {
            return Ok(BatchReport::default());
        }

        // Plain pipeline, never MULTI/EXEC: commands apply independently.
        let mut pipe = Pipeline::with_capacity(batch.len());
        for command in batch.commands() {
            pipe.add_command(self.to_cmd(command));
        }

        // Sent as raw packed commands so server errors stay per-reply values;
        // `Pipeline::query_async` would collapse them into the first error.
        let mut conn = self.connection().await?;
        let replies = conn.send_packed_commands(&pipe, 0, batch.len()).await?;

        let outcomes = replies
            .iter()
            .map(|reply| match describe_server_error(reply) {
                Some(message) => Err(message),
                None => Ok(()),
            })
            .collect();
        Ok(BatchReport::new(outcomes))
    }

    async fn top_by_score(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, StorageError> {
        let mut conn = self.connection().await?;
        let ranked: Vec<(String, f64)> = redis::cmd("ZREVRANGEBYSCORE")
            .arg(self.key(key))
            .arg("+inf")
            .arg(0)
            .arg("WITHSCORES")
            .arg("LIMIT")
            .arg(0)
            .arg(limit)
            .query_async(&mut conn)
            .await?;
        Ok(ranked)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await?;
        Ok(fields)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StorageError> {
        let mut conn = self.connection().await?;
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await?;
        Ok(members)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", self.namespace);
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                let _: () = redis::cmd("UNLINK").arg(&keys).query_async(&mut conn).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(())
    }

    async fn close(&self) {
        if self.connection.write().await.take().is_some() {
            tracing::debug!("Released redis connection (namespace {:?})", self.namespace);
        }
    }
}
