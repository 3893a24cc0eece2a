// FigChunk - content-aware chunking for design documents
// Copyright (C) 2025 FigChunk Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Key-value (Redis) storage adapter.
//!
//! Key space: `<prefix><id>` for the payload, `<prefix>index` for the
//! set of all known ids, `<prefix>type:<type>` and `<prefix>file:<fileKey>`
//! for the per-type/per-file indices. Writes are a pipelined transaction:
//! `SETEX` the payload, then three `SADD`s into the indices. A partial
//! failure between the payload write and the index updates is tolerated
//! — the payload is the source of truth and indices are re-derivable on
//! cleanup.

use crate::error::{StorageError, StorageResult};
use crate::wire::PersistedChunk;
use async_trait::async_trait;
use chrono::Utc;
use figchunk_core::{Chunk, ChunkFilter, ChunkSummary, ChunkType};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration as StdDuration;
use tokio::sync::OnceCell;
use tracing::warn;

/// Retry policy applied to the initial connection attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryStrategy {
    /// Maximum number of connection attempts before giving up.
    pub max_retry_count: u32,
    /// Delay between attempts.
    pub retry_interval: StdDuration,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy {
            max_retry_count: 3,
            retry_interval: StdDuration::from_millis(200),
        }
    }
}

/// Connection target: a single host, or a node list with `cluster=true`.
#[derive(Debug, Clone)]
pub enum ConnectionTarget {
    /// A single Redis (or Redis-compatible) node.
    Single {
        /// Host.
        host: String,
        /// Port.
        port: u16,
        /// Optional username (Redis ACL).
        username: Option<String>,
        /// Optional password.
        password: Option<String>,
        /// Logical database index.
        db: Option<i64>,
    },
    /// A cluster node list. Represented here as the first reachable
    /// node's URL — a full cluster client is out of scope for the demo
    /// adapter; the shape is kept so the configuration surface still
    /// takes `nodes[]`, `cluster=true`.
    Cluster {
        /// Candidate node URLs.
        nodes: Vec<String>,
    },
}

impl ConnectionTarget {
    fn to_url(&self) -> StorageResult<String> {
        match self {
            ConnectionTarget::Single {
                host,
                port,
                username,
                password,
                db,
            } => {
                let auth = match (username, password) {
                    (Some(u), Some(p)) => format!("{u}:{p}@"),
                    (None, Some(p)) => format!(":{p}@"),
                    _ => String::new(),
                };
                let db_segment = db.map(|d| format!("/{d}")).unwrap_or_default();
                Ok(format!("redis://{auth}{host}:{port}{db_segment}"))
            }
            ConnectionTarget::Cluster { nodes } => nodes
                .first()
                .cloned()
                .ok_or_else(|| StorageError::permanent("cluster node list is empty")),
        }
    }
}

/// Construction parameters for [`KvAdapter`].
#[derive(Debug, Clone)]
pub struct KvAdapterConfig {
    /// Where to connect.
    pub connection: ConnectionTarget,
    /// Prefix applied to every key this adapter touches.
    pub key_prefix: String,
    /// TTL (seconds) applied when a chunk has no explicit `expires`.
    pub default_ttl: StdDuration,
    /// Timeout for establishing the connection.
    pub connect_timeout: StdDuration,
    /// Timeout for individual commands.
    pub command_timeout: StdDuration,
    /// Retry policy for the initial connect.
    pub retry_strategy: RetryStrategy,
}

impl KvAdapterConfig {
    fn index_key(&self) -> String {
        format!("{}index", self.key_prefix)
    }
    fn type_key(&self, t: ChunkType) -> String {
        format!("{}type:{}", self.key_prefix, t.as_str())
    }
    fn file_key(&self, fk: &str) -> String {
        format!("{}file:{}", self.key_prefix, fk)
    }
    fn payload_key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }
}

/// Redis realization of [`crate::StorageAdapter`].
///
/// Connects lazily: the first operation that needs a connection drives
/// a single in-flight connect future (via [`OnceCell`]), so concurrent
/// callers during startup share one connection attempt instead of
/// racing independent ones.
#[derive(Debug)]
pub struct KvAdapter {
    config: KvAdapterConfig,
    conn: OnceCell<ConnectionManager>,
}

impl KvAdapter {
    /// Construct an adapter. Does not connect until first use.
    pub fn new(config: KvAdapterConfig) -> Self {
        KvAdapter {
            config,
            conn: OnceCell::new(),
        }
    }

    async fn connection(&self) -> StorageResult<ConnectionManager> {
        self.conn
            .get_or_try_init(|| async {
                let url = self.config.connection.to_url()?;
                let mut last_err = None;
                for attempt in 0..=self.config.retry_strategy.max_retry_count {
                    let client = redis::Client::open(url.clone())
                        .map_err(|e| StorageError::permanent(format!("invalid redis url: {e}")))?;
                    match tokio::time::timeout(
                        self.config.connect_timeout,
                        client.get_connection_manager(),
                    )
                    .await
                    {
                        Ok(Ok(mgr)) => return Ok(mgr),
                        Ok(Err(e)) => last_err = Some(e.to_string()),
                        Err(_) => last_err = Some("connect timed out".to_string()),
                    }
                    if attempt < self.config.retry_strategy.max_retry_count {
                        tokio::time::sleep(self.config.retry_strategy.retry_interval).await;
                    }
                }
                Err(StorageError::transient(format!(
                    "failed to connect to redis after retries: {}",
                    last_err.unwrap_or_default()
                )))
            })
            .await
            .cloned()
    }

    fn ttl_seconds(&self, chunk: &Chunk) -> i64 {
        match chunk.expires {
            Some(exp) => {
                let secs = (exp - Utc::now()).num_seconds();
                secs.max(1)
            }
            None => self.config.default_ttl.as_secs().max(1) as i64,
        }
    }
}

#[async_trait]
impl crate::StorageAdapter for KvAdapter {
    async fn save(&self, chunk: &Chunk) -> StorageResult<()> {
        let mut conn = self.connection().await?;
        let payload = PersistedChunk::from(chunk);
        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| StorageError::permanent(format!("serialize failed: {e}")))?;
        let ttl = self.ttl_seconds(chunk);

        let result: redis::RedisResult<()> = redis::pipe()
            .atomic()
            .set_ex(self.config.payload_key(&chunk.id), bytes, ttl as u64)
            .sadd(self.config.index_key(), &chunk.id)
            .sadd(self.config.type_key(chunk.chunk_type), &chunk.id)
            .sadd(self.config.file_key(&chunk.file_key), &chunk.id)
            .query_async(&mut conn)
            .await;
        result.map_err(|e| StorageError::transient(format!("redis transaction failed: {e}")))
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Chunk>> {
        let mut conn = self.connection().await?;
        let bytes: Option<Vec<u8>> = conn
            .get(self.config.payload_key(id))
            .await
            .map_err(|e| StorageError::transient(format!("redis GET failed: {e}")))?;
        let Some(bytes) = bytes else { return Ok(None) };
        let persisted: PersistedChunk = match serde_json::from_slice(&bytes) {
            Ok(p) => p,
            Err(e) => {
                warn!(id = %id, error = %e, "corrupt KV payload, skipping");
                return Ok(None);
            }
        };
        let mut chunk: Chunk = persisted.into();
        if let Some(expires) = chunk.expires {
            if expires < Utc::now() {
                return Ok(None);
            }
        }
        chunk.last_accessed = Utc::now();
        let refreshed = PersistedChunk::from(&chunk);
        if let Ok(bytes) = serde_json::to_vec(&refreshed) {
            let ttl = self.ttl_seconds(&chunk);
            let result: redis::RedisResult<()> = redis::pipe()
                .atomic()
                .set_ex(self.config.payload_key(id), bytes, ttl as u64)
                .sadd(self.config.index_key(), id)
                .sadd(self.config.type_key(chunk.chunk_type), id)
                .sadd(self.config.file_key(&chunk.file_key), id)
                .query_async(&mut conn)
                .await;
            if let Err(e) = result {
                warn!(id = %id, error = %e, "failed to refresh last_accessed/TTL");
            }
        }
        Ok(Some(chunk))
    }

    async fn has(&self, id: &str) -> StorageResult<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn
            .exists(self.config.payload_key(id))
            .await
            .map_err(|e| StorageError::transient(format!("redis EXISTS failed: {e}")))?;
        Ok(exists)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut conn = self.connection().await?;
        let bytes: Option<Vec<u8>> = conn
            .get(self.config.payload_key(id))
            .await
            .map_err(|e| StorageError::transient(format!("redis GET failed: {e}")))?;
        let Some(bytes) = bytes else { return Ok(false) };
        let (chunk_type, file_key) = match serde_json::from_slice::<PersistedChunk>(&bytes) {
            Ok(p) => (p.chunk_type, p.file_key),
            Err(_) => {
                // Can't learn type/fileKey from a corrupt payload; still
                // remove the payload and the global index entry.
                let _: redis::RedisResult<()> = redis::pipe()
                    .atomic()
                    .del(self.config.payload_key(id))
                    .srem(self.config.index_key(), id)
                    .query_async(&mut conn)
                    .await;
                return Ok(true);
            }
        };
        let result: redis::RedisResult<()> = redis::pipe()
            .atomic()
            .del(self.config.payload_key(id))
            .srem(self.config.index_key(), id)
            .srem(self.config.type_key(chunk_type), id)
            .srem(self.config.file_key(&file_key), id)
            .query_async(&mut conn)
            .await;
        result
            .map(|_| true)
            .map_err(|e| StorageError::transient(format!("redis delete failed: {e}")))
    }

    async fn list(&self, filter: Option<ChunkFilter>) -> StorageResult<Vec<ChunkSummary>> {
        let filter = filter.unwrap_or_default();
        let mut conn = self.connection().await?;

        // Choose the narrowest index available: fileKey > type > global.
        let index_key = if let Some(ref fk) = filter.file_key {
            self.config.file_key(fk)
        } else if let Some(t) = filter.chunk_type {
            self.config.type_key(t)
        } else {
            self.config.index_key()
        };
        let ids: Vec<String> = conn
            .smembers(index_key)
            .await
            .map_err(|e| StorageError::transient(format!("redis SMEMBERS failed: {e}")))?;

        let now = Utc::now();
        let mut summaries = Vec::new();
        for id in ids {
            let bytes: Option<Vec<u8>> = conn
                .get(self.config.payload_key(&id))
                .await
                .map_err(|e| StorageError::transient(format!("redis GET failed: {e}")))?;
            let Some(bytes) = bytes else { continue };
            let Ok(persisted) = serde_json::from_slice::<PersistedChunk>(&bytes) else {
                continue;
            };
            let chunk: Chunk = persisted.into();
            let size = serde_json::to_vec(&chunk.data).map(|v| v.len()).unwrap_or(0);
            let summary = chunk.summary(size);
            if filter.matches(&summary, chunk.expires, now) {
                summaries.push(summary);
            }
        }
        filter.sort(&mut summaries);
        summaries.truncate(filter.limit);
        Ok(summaries)
    }

    async fn cleanup(&self) -> StorageResult<usize> {
        // Redis expires keys itself via SETEX; this walks the global
        // index and prunes entries whose payload already expired
        // (Redis evicted the key but the SADD'd id remains), keeping
        // the indices re-derived from the payload's existence.
        let mut conn = self.connection().await?;
        let ids: Vec<String> = conn
            .smembers(self.config.index_key())
            .await
            .map_err(|e| StorageError::transient(format!("redis SMEMBERS failed: {e}")))?;
        let mut evicted = 0usize;
        for id in ids {
            let exists: bool = conn
                .exists(self.config.payload_key(&id))
                .await
                .unwrap_or(true);
            if !exists {
                let _: redis::RedisResult<()> = conn.srem(self.config.index_key(), &id).await;
                evicted += 1;
            }
        }
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_target_renders_url_with_auth() {
        let target = ConnectionTarget::Single {
            host: "localhost".into(),
            port: 6379,
            username: None,
            password: Some("secret".into()),
            db: Some(2),
        };
        assert_eq!(target.to_url().unwrap(), "redis://:secret@localhost:6379/2");
    }

    #[test]
    fn cluster_target_uses_first_node() {
        let target = ConnectionTarget::Cluster {
            nodes: vec!["redis://a:6379".into(), "redis://b:6379".into()],
        };
        assert_eq!(target.to_url().unwrap(), "redis://a:6379");
    }

    #[test]
    fn cluster_target_empty_nodes_errors() {
        let target = ConnectionTarget::Cluster { nodes: vec![] };
        assert!(target.to_url().is_err());
    }

    #[test]
    fn key_space_matches_expected_layout() {
        let cfg = KvAdapterConfig {
            connection: ConnectionTarget::Single {
                host: "localhost".into(),
                port: 6379,
                username: None,
                password: None,
                db: None,
            },
            key_prefix: "figchunk:".into(),
            default_ttl: StdDuration::from_secs(3600),
            connect_timeout: StdDuration::from_secs(5),
            command_timeout: StdDuration::from_secs(5),
            retry_strategy: RetryStrategy::default(),
        };
        assert_eq!(cfg.index_key(), "figchunk:index");
        assert_eq!(cfg.type_key(ChunkType::Node), "figchunk:type:node");
        assert_eq!(cfg.file_key("abc"), "figchunk:file:abc");
        assert_eq!(cfg.payload_key("abc:node:1"), "figchunk:abc:node:1");
    }
}
