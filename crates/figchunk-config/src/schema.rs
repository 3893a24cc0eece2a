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

//! Configuration schema: chunker knobs, the storage backend tagged
//! union, and ambient observability
//! settings. Every section is `#[serde(default)]` so a partial file
//! (or none at all) still produces a usable [`Config`].

use figchunk_core::ChunkerConfig;
use figchunk_storage::docstore::{DocumentStoreConfig, DocumentStoreOptions};
use figchunk_storage::kv::{ConnectionTarget, KvAdapterConfig, RetryStrategy};
use figchunk_storage::local::{FilesystemAdapterConfig, HashAlgorithm};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

/// Top-level configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chunking engine knobs.
    pub chunker: ChunkerConfig,

    /// Which storage backend to use and how to reach it.
    pub storage: StorageBackendConfig,

    /// Logging and metrics exposition.
    pub observability: ObservabilityConfig,

    /// Custom user-defined settings, passed through untouched.
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chunker: ChunkerConfig::default(),
            storage: StorageBackendConfig::default(),
            observability: ObservabilityConfig::default(),
            custom: HashMap::new(),
        }
    }
}

/// Storage backend configuration: a tagged union over the
/// three adapters figchunk-storage implements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageBackendConfig {
    /// Sharded-directory filesystem adapter.
    Filesystem(FilesystemConfig),
    /// Redis (or Redis-compatible) key-value adapter.
    Kv(KvConfig),
    /// MongoDB document-store adapter.
    Document(DocumentConfig),
}

impl Default for StorageBackendConfig {
    fn default() -> Self {
        StorageBackendConfig::Filesystem(FilesystemConfig::default())
    }
}

/// Filesystem adapter section of the configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    /// Root directory under which shard directories are created.
    pub base_path: PathBuf,
    /// Whether to use sibling lock files around writes/deletes.
    pub use_locks: bool,
    /// A lock older than this (ms) is considered stale and reclaimable.
    pub lock_timeout_ms: u64,
    /// TTL (ms) applied to chunks saved without an explicit `expires`.
    pub default_ttl_ms: u64,
    /// Hash function used for shard path derivation.
    pub hash_algorithm: HashAlgorithm,
    /// Run a cleanup sweep immediately after the adapter is constructed.
    pub cleanup_on_start: bool,
    /// Interval (ms) for the periodic cleanup task; `None` disables it.
    pub cleanup_interval_ms: Option<u64>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        FilesystemConfig {
            base_path: PathBuf::from(".figchunk/chunks"),
            use_locks: true,
            lock_timeout_ms: 30_000,
            default_ttl_ms: 86_400_000,
            hash_algorithm: HashAlgorithm::default(),
            cleanup_on_start: false,
            cleanup_interval_ms: None,
        }
    }
}

impl FilesystemConfig {
    /// Translate into the construction parameters `figchunk-storage`'s
    /// `FilesystemAdapter` actually takes.
    pub fn to_adapter_config(&self) -> FilesystemAdapterConfig {
        FilesystemAdapterConfig {
            base_path: self.base_path.clone(),
            use_locks: self.use_locks,
            lock_timeout: StdDuration::from_millis(self.lock_timeout_ms),
            default_ttl: StdDuration::from_millis(self.default_ttl_ms),
            hash_algorithm: self.hash_algorithm,
        }
    }
}

/// KV (Redis) adapter section of the configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Connection target: a single node, or a node list with `cluster`.
    pub connection: KvConnectionConfig,
    /// Prefix applied to every key this adapter touches.
    pub key_prefix: String,
    /// TTL (seconds) applied when a chunk has no explicit `expires`.
    pub default_ttl_secs: u64,
    /// Timeout (ms) for establishing the connection.
    pub connect_timeout_ms: u64,
    /// Timeout (ms) for individual commands.
    pub command_timeout_ms: u64,
    /// Retry policy for the initial connect.
    pub retry_strategy: RetryStrategyConfig,
}

impl Default for KvConfig {
    fn default() -> Self {
        KvConfig {
            connection: KvConnectionConfig::default(),
            key_prefix: "figchunk:".to_string(),
            default_ttl_secs: 86_400,
            connect_timeout_ms: 5_000,
            command_timeout_ms: 2_000,
            retry_strategy: RetryStrategyConfig::default(),
        }
    }
}

impl KvConfig {
    /// Translate into `figchunk-storage`'s `KvAdapterConfig`.
    pub fn to_adapter_config(&self) -> KvAdapterConfig {
        KvAdapterConfig {
            connection: self.connection.to_target(),
            key_prefix: self.key_prefix.clone(),
            default_ttl: StdDuration::from_secs(self.default_ttl_secs),
            connect_timeout: StdDuration::from_millis(self.connect_timeout_ms),
            command_timeout: StdDuration::from_millis(self.command_timeout_ms),
            retry_strategy: self.retry_strategy.to_retry_strategy(),
        }
    }
}

/// `connection{host,port,username?,password?,db?}` or `nodes[]` with
/// `cluster=true`. Kept as one flat struct (rather than a
/// `#[serde(untagged)]` enum) so a config file can use either shape
/// without a discriminator field of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvConnectionConfig {
    /// Single-node host. Ignored when `cluster` is true.
    pub host: Option<String>,
    /// Single-node port. Ignored when `cluster` is true.
    pub port: Option<u16>,
    /// Optional username (Redis ACL).
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Logical database index.
    pub db: Option<i64>,
    /// Treat `nodes` as a cluster node list instead of a single target.
    pub cluster: bool,
    /// Candidate node URLs, used only when `cluster` is true.
    pub nodes: Vec<String>,
}

impl Default for KvConnectionConfig {
    fn default() -> Self {
        KvConnectionConfig {
            host: Some("127.0.0.1".to_string()),
            port: Some(6379),
            username: None,
            password: None,
            db: None,
            cluster: false,
            nodes: Vec::new(),
        }
    }
}

impl KvConnectionConfig {
    fn to_target(&self) -> ConnectionTarget {
        if self.cluster {
            ConnectionTarget::Cluster {
                nodes: self.nodes.clone(),
            }
        } else {
            ConnectionTarget::Single {
                host: self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string()),
                port: self.port.unwrap_or(6379),
                username: self.username.clone(),
                password: self.password.clone(),
                db: self.db,
            }
        }
    }
}

/// Retry policy, mirrored 1:1 onto `figchunk_storage::kv::RetryStrategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryStrategyConfig {
    /// Maximum number of connection attempts before giving up.
    pub max_retry_count: u32,
    /// Delay (ms) between attempts.
    pub retry_interval_ms: u64,
}

impl Default for RetryStrategyConfig {
    fn default() -> Self {
        RetryStrategyConfig {
            max_retry_count: 3,
            retry_interval_ms: 200,
        }
    }
}

impl RetryStrategyConfig {
    fn to_retry_strategy(&self) -> RetryStrategy {
        RetryStrategy {
            max_retry_count: self.max_retry_count,
            retry_interval: StdDuration::from_millis(self.retry_interval_ms),
        }
    }
}

/// Document-store (MongoDB) adapter section of the configuration
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// MongoDB connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Collection name.
    pub collection: String,
    /// Driver-level options.
    pub options: DocumentStoreOptionsConfig,
    /// Extra index field names to create beyond the adapter's defaults
    /// (`file_key`, `type`, and the TTL index on `last_accessed`).
    #[serde(default)]
    pub indexes: Vec<String>,
    /// TTL (seconds) applied when a chunk has no explicit `expires`.
    pub default_ttl_secs: u64,
    /// Retry policy for the initial connect.
    pub retry_strategy: RetryStrategyConfig,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            uri: "mongodb://127.0.0.1:27017".to_string(),
            database: "figchunk".to_string(),
            collection: "chunks".to_string(),
            options: DocumentStoreOptionsConfig::default(),
            indexes: Vec::new(),
            default_ttl_secs: 86_400,
            retry_strategy: RetryStrategyConfig::default(),
        }
    }
}

impl DocumentConfig {
    /// Translate into `figchunk-storage`'s `DocumentStoreConfig`.
    pub fn to_adapter_config(&self) -> DocumentStoreConfig {
        DocumentStoreConfig {
            uri: self.uri.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            options: self.options.to_options(),
            default_ttl: StdDuration::from_secs(self.default_ttl_secs),
        }
    }
}

/// Driver-level MongoDB options (the `options{...}` block).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStoreOptionsConfig {
    /// Maximum connection pool size.
    pub max_pool_size: Option<u32>,
    /// Server selection timeout (ms).
    pub server_selection_timeout_ms: Option<u64>,
    /// Connection establishment timeout (ms).
    pub connect_timeout_ms: Option<u64>,
    /// Per-socket read/write timeout (ms).
    pub socket_timeout_ms: Option<u64>,
    /// Path to a CA bundle for TLS, if required.
    pub tls_ca_file: Option<String>,
}

impl Default for DocumentStoreOptionsConfig {
    fn default() -> Self {
        DocumentStoreOptionsConfig {
            max_pool_size: None,
            server_selection_timeout_ms: None,
            connect_timeout_ms: None,
            socket_timeout_ms: None,
            tls_ca_file: None,
        }
    }
}

impl DocumentStoreOptionsConfig {
    fn to_options(&self) -> DocumentStoreOptions {
        DocumentStoreOptions {
            max_pool_size: self.max_pool_size,
            server_selection_timeout: self.server_selection_timeout_ms.map(StdDuration::from_millis),
            connect_timeout: self.connect_timeout_ms.map(StdDuration::from_millis),
            socket_timeout: self.socket_timeout_ms.map(StdDuration::from_millis),
            tls_ca_file: self.tls_ca_file.clone(),
        }
    }
}

/// Ambient logging and metrics-exposition settings. Not one of the
/// chunker/adapter sections, but carried the way the rest of the
/// corpus carries its observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, text).
    pub log_format: String,
    /// Enable tracing spans around chunking/storage operations.
    pub tracing_enabled: bool,
    /// Metrics exposition.
    pub metrics: MetricsConfig,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            tracing_enabled: true,
            metrics: MetricsConfig::default(),
        }
    }
}

/// Prometheus exposition server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the metrics HTTP endpoint.
    pub enabled: bool,
    /// Port the metrics server listens on.
    pub port: u16,
    /// Metrics endpoint path.
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            enabled: false,
            port: 9090,
            endpoint: "/metrics".to_string(),
        }
    }
}
