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

//! Filesystem storage adapter.
//!
//! Layout: `<base>/<first-two-hex-chars-of-hash(id)>/<hash(id)>.json`.
//! Writes go to a `.tmp` sibling and are renamed into place; when the
//! rename fails because `.tmp` and the target straddle a filesystem
//! boundary, falls back to copy-then-unlink. Locking is advisory and
//! availability-first: a lock held by another writer and not yet stale
//! never blocks a write — it's downgraded to a logged warning.

use crate::error::{StorageError, StorageResult};
use crate::wire::PersistedChunk;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use figchunk_core::{Chunk, ChunkFilter, ChunkSummary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;
use tokio::fs;
use tracing::{debug, warn};

/// Hash function used to derive a chunk's shard path from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 — fastest, used by default.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Md5
    }
}

impl HashAlgorithm {
    fn digest_hex(self, id: &str) -> String {
        match self {
            HashAlgorithm::Md5 => {
                use md5::{Digest, Md5};
                let mut hasher = Md5::new();
                hasher.update(id.as_bytes());
                hex::encode(hasher.finalize())
            }
            HashAlgorithm::Sha1 => {
                use sha1::{Digest, Sha1};
                let mut hasher = Sha1::new();
                hasher.update(id.as_bytes());
                hex::encode(hasher.finalize())
            }
            HashAlgorithm::Sha256 => {
                use sha2::{Digest, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(id.as_bytes());
                hex::encode(hasher.finalize())
            }
        }
    }
}

/// Construction parameters for [`FilesystemAdapter`].
#[derive(Debug, Clone)]
pub struct FilesystemAdapterConfig {
    /// Root directory under which shard directories are created.
    pub base_path: PathBuf,
    /// Whether to use sibling `.lock` files around writes/deletes.
    pub use_locks: bool,
    /// A lock older than this is considered stale and reclaimable.
    pub lock_timeout: StdDuration,
    /// TTL applied to chunks saved without an explicit `expires`.
    pub default_ttl: StdDuration,
    /// Hash function used for shard path derivation.
    pub hash_algorithm: HashAlgorithm,
}

impl Default for FilesystemAdapterConfig {
    fn default() -> Self {
        FilesystemAdapterConfig {
            base_path: PathBuf::from(".figchunk/chunks"),
            use_locks: true,
            lock_timeout: StdDuration::from_millis(30_000),
            default_ttl: StdDuration::from_millis(86_400_000),
            hash_algorithm: HashAlgorithm::Md5,
        }
    }
}

/// Filesystem realization of [`crate::StorageAdapter`].
#[derive(Debug, Clone)]
pub struct FilesystemAdapter {
    config: FilesystemAdapterConfig,
}

impl FilesystemAdapter {
    /// Create an adapter rooted at `config.base_path`, creating the
    /// directory if absent. Runs an initial [`Self::cleanup`] sweep
    /// when `cleanup_on_start` semantics are requested by the caller
    /// (the chunker/CLI layer decides whether to call it; this
    /// constructor only ensures the directory exists).
    pub async fn new(config: FilesystemAdapterConfig) -> StorageResult<Self> {
        fs::create_dir_all(&config.base_path)
            .await
            .map_err(|e| StorageError::permanent(format!("cannot create base path: {e}")))?;
        Ok(FilesystemAdapter { config })
    }

    fn shard_path(&self, id: &str) -> PathBuf {
        let digest = self.config.hash_algorithm.digest_hex(id);
        let shard = &digest[..2.min(digest.len())];
        self.config
            .base_path
            .join(shard)
            .join(format!("{digest}.json"))
    }

    fn lock_path(path: &Path) -> PathBuf {
        let mut p = path.as_os_str().to_os_string();
        p.push(".lock");
        PathBuf::from(p)
    }

    /// Acquire the sibling lock file, if locking is enabled. Returns
    /// `true` if a lock file was created and should be released by the
    /// caller. Never fails the caller's operation — a contended,
    /// non-stale lock downgrades to a warning and the caller proceeds
    /// without exclusivity, surfacing a `LockUnavailable` to interested callers.
    async fn try_acquire_lock(&self, path: &Path) -> bool {
        if !self.config.use_locks {
            return false;
        }
        let lock_path = Self::lock_path(path);
        if let Ok(meta) = fs::metadata(&lock_path).await {
            let stale = meta
                .modified()
                .ok()
                .and_then(|m| m.elapsed().ok())
                .map(|age| age > self.config.lock_timeout)
                .unwrap_or(true);
            if !stale {
                warn!(path = %path.display(), "lock held and not stale; proceeding without it");
                return false;
            }
            debug!(path = %path.display(), "reclaiming stale lock");
        }
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "pid": std::process::id(),
        });
        match serde_json::to_vec(&payload) {
            Ok(bytes) => {
                if let Err(e) = fs::write(&lock_path, bytes).await {
                    warn!(error = %e, "failed to write lock file; proceeding without it");
                    false
                } else {
                    true
                }
            }
            Err(_) => false,
        }
    }

    async fn release_lock(&self, path: &Path) {
        let lock_path = Self::lock_path(path);
        let _ = fs::remove_file(&lock_path).await;
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::permanent(format!("cannot create shard dir: {e}")))?;
        }
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| StorageError::transient(format!("write failed: {e}")))?;
        if fs::rename(&tmp_path, path).await.is_err() {
            // Rename across a filesystem boundary can fail; fall back to
            // copy + unlink so the write still lands.
            fs::copy(&tmp_path, path)
                .await
                .map_err(|e| StorageError::transient(format!("copy fallback failed: {e}")))?;
            let _ = fs::remove_file(&tmp_path).await;
        }
        Ok(())
    }

    async fn read_chunk_file(path: &Path) -> StorageResult<Option<Chunk>> {
        match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice::<PersistedChunk>(&bytes) {
                Ok(persisted) => Ok(Some(persisted.into())),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt chunk payload, skipping");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::transient(format!("read failed: {e}"))),
        }
    }

    /// Walk every shard directory, yielding `(path, chunk)` for each
    /// parseable, non-lock JSON file.
    async fn walk_all(&self) -> StorageResult<Vec<(PathBuf, Chunk)>> {
        let mut out = Vec::new();
        let mut shard_dirs = match fs::read_dir(&self.config.base_path).await {
            Ok(rd) => rd,
            Err(_) => return Ok(out),
        };
        while let Ok(Some(shard_entry)) = shard_dirs.next_entry().await {
            let shard_path = shard_entry.path();
            if !shard_path.is_dir() {
                continue;
            }
            let mut files = match fs::read_dir(&shard_path).await {
                Ok(rd) => rd,
                Err(_) => continue,
            };
            while let Ok(Some(file_entry)) = files.next_entry().await {
                let path = file_entry.path();
                let is_chunk_json = path.extension().map(|e| e == "json").unwrap_or(false)
                    && !path.to_string_lossy().ends_with(".json.tmp");
                if !is_chunk_json {
                    continue;
                }
                if let Some(chunk) = Self::read_chunk_file(&path).await? {
                    out.push((path, chunk));
                }
            }
        }
        Ok(out)
    }

    /// Spawn a cancellable background sweep that calls [`Self::cleanup`]
    /// on `interval`. The returned handle's `abort()` is the
    /// cancellation mechanism callers are expected to use; dropping the handle
    /// does not itself stop the task (tokio semantics), so callers that
    /// need cancellation-on-drop should wrap it.
    pub fn spawn_periodic_cleanup(
        self: std::sync::Arc<Self>,
        interval: StdDuration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.cleanup().await {
                    warn!(error = %e, "periodic filesystem cleanup failed");
                }
            }
        })
    }
}

#[async_trait]
impl crate::StorageAdapter for FilesystemAdapter {
    async fn save(&self, chunk: &Chunk) -> StorageResult<()> {
        let mut chunk = chunk.clone();
        if chunk.expires.is_none() {
            chunk.expires = Some(
                chunk.created
                    + chrono::Duration::from_std(self.config.default_ttl)
                        .unwrap_or_else(|_| chrono::Duration::zero()),
            );
        }
        let path = self.shard_path(&chunk.id);
        let held_lock = self.try_acquire_lock(&path).await;
        let persisted = PersistedChunk::from(&chunk);
        let bytes = serde_json::to_vec_pretty(&persisted)
            .map_err(|e| StorageError::permanent(format!("serialize failed: {e}")))?;
        let result = self.write_atomic(&path, &bytes).await;
        if held_lock {
            self.release_lock(&path).await;
        }
        result
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Chunk>> {
        let path = self.shard_path(id);
        let Some(mut chunk) = Self::read_chunk_file(&path).await? else {
            return Ok(None);
        };
        if let Some(expires) = chunk.expires {
            if expires < Utc::now() {
                let _ = fs::remove_file(&path).await;
                return Ok(None);
            }
        }
        chunk.last_accessed = Utc::now();
        let persisted = PersistedChunk::from(&chunk);
        if let Ok(bytes) = serde_json::to_vec_pretty(&persisted) {
            if let Err(e) = self.write_atomic(&path, &bytes).await {
                warn!(id = %id, error = %e, "failed to update last_accessed");
            }
        }
        Ok(Some(chunk))
    }

    async fn has(&self, id: &str) -> StorageResult<bool> {
        let path = self.shard_path(id);
        match Self::read_chunk_file(&path).await? {
            None => Ok(false),
            Some(chunk) => Ok(chunk.expires.map(|e| e >= Utc::now()).unwrap_or(true)),
        }
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let path = self.shard_path(id);
        let held_lock = self.try_acquire_lock(&path).await;
        let existed = fs::metadata(&path).await.is_ok();
        if existed {
            if let Err(e) = fs::remove_file(&path).await {
                if held_lock {
                    self.release_lock(&path).await;
                }
                return Err(StorageError::transient(format!("delete failed: {e}")));
            }
        }
        if held_lock {
            self.release_lock(&path).await;
        }
        Ok(existed)
    }

    async fn list(&self, filter: Option<ChunkFilter>) -> StorageResult<Vec<ChunkSummary>> {
        let filter = filter.unwrap_or_default();
        let now = Utc::now();
        let all = self.walk_all().await?;
        let mut summaries: Vec<(ChunkSummary, Option<DateTime<Utc>>)> = all
            .into_iter()
            .map(|(_, chunk)| {
                let size = serde_json::to_vec(&chunk.data).map(|v| v.len()).unwrap_or(0);
                (chunk.summary(size), chunk.expires)
            })
            .collect();
        summaries.retain(|(summary, expires)| filter.matches(summary, *expires, now));
        let mut only_summaries: Vec<ChunkSummary> = summaries.into_iter().map(|(s, _)| s).collect();
        filter.sort(&mut only_summaries);
        only_summaries.truncate(filter.limit);
        Ok(only_summaries)
    }

    async fn cleanup(&self) -> StorageResult<usize> {
        let now = Utc::now();
        let all = self.walk_all().await?;
        let mut evicted = 0usize;
        for (path, chunk) in all {
            if let Some(expires) = chunk.expires {
                if expires < now {
                    if let Err(e) = fs::remove_file(&path).await {
                        warn!(path = %path.display(), error = %e, "cleanup: failed to remove expired chunk");
                        continue;
                    }
                    evicted += 1;
                }
            }
        }
        // Remove now-empty shard directories.
        if let Ok(mut shard_dirs) = fs::read_dir(&self.config.base_path).await {
            while let Ok(Some(entry)) = shard_dirs.next_entry().await {
                let path = entry.path();
                if path.is_dir() {
                    if let Ok(mut rd) = fs::read_dir(&path).await {
                        if rd.next_entry().await.ok().flatten().is_none() {
                            let _ = fs::remove_dir(&path).await;
                        }
                    }
                }
            }
        }
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageAdapter as _;
    use figchunk_core::{Chunk, ChunkType};
    use serde_json::json;
    use tempfile::tempdir;

    fn cfg(base: &Path) -> FilesystemAdapterConfig {
        FilesystemAdapterConfig {
            base_path: base.to_path_buf(),
            use_locks: true,
            lock_timeout: StdDuration::from_millis(100),
            default_ttl: StdDuration::from_millis(86_400_000),
            hash_algorithm: HashAlgorithm::Sha256,
        }
    }

    #[tokio::test]
    async fn save_then_get_roundtrips_modulo_last_accessed() {
        let dir = tempdir().unwrap();
        let adapter = FilesystemAdapter::new(cfg(dir.path())).await.unwrap();
        let chunk = Chunk::new("fk:node:abc", "fk", ChunkType::Node, json!({"name": "n"}));
        adapter.save(&chunk).await.unwrap();

        let fetched = adapter.get(&chunk.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, chunk.id);
        assert_eq!(fetched.data, chunk.data);
        assert_eq!(fetched.file_key, chunk.file_key);
    }

    #[tokio::test]
    async fn s6_expired_chunk_is_absent_and_file_removed() {
        let dir = tempdir().unwrap();
        let adapter = FilesystemAdapter::new(cfg(dir.path())).await.unwrap();
        let mut chunk = Chunk::new("fk:node:exp", "fk", ChunkType::Node, json!({}));
        chunk.expires = Some(Utc::now() - chrono::Duration::milliseconds(1));
        adapter.save(&chunk).await.unwrap();

        let path = adapter.shard_path(&chunk.id);
        assert!(path.exists());

        let fetched = adapter.get(&chunk.id).await.unwrap();
        assert!(fetched.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn has_reflects_existence() {
        let dir = tempdir().unwrap();
        let adapter = FilesystemAdapter::new(cfg(dir.path())).await.unwrap();
        assert!(!adapter.has("fk:node:missing").await.unwrap());
        let chunk = Chunk::new("fk:node:present", "fk", ChunkType::Node, json!({}));
        adapter.save(&chunk).await.unwrap();
        assert!(adapter.has(&chunk.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_whether_it_existed() {
        let dir = tempdir().unwrap();
        let adapter = FilesystemAdapter::new(cfg(dir.path())).await.unwrap();
        let chunk = Chunk::new("fk:node:d", "fk", ChunkType::Node, json!({}));
        adapter.save(&chunk).await.unwrap();

        assert!(adapter.delete(&chunk.id).await.unwrap());
        assert!(!adapter.delete(&chunk.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_applies_filter_and_sort() {
        let dir = tempdir().unwrap();
        let adapter = FilesystemAdapter::new(cfg(dir.path())).await.unwrap();
        for i in 0..3 {
            let chunk = Chunk::new(format!("fk:node:{i}"), "fk", ChunkType::Node, json!({"i": i}));
            adapter.save(&chunk).await.unwrap();
        }
        let mut filter = ChunkFilter::default();
        filter.sort_by = figchunk_core::SortField::Id;
        filter.sort_direction = figchunk_core::SortDirection::Asc;
        let summaries = adapter.list(Some(filter)).await.unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].id, "fk:node:0");
        assert_eq!(summaries[2].id, "fk:node:2");
    }

    #[tokio::test]
    async fn cleanup_evicts_only_expired() {
        let dir = tempdir().unwrap();
        let adapter = FilesystemAdapter::new(cfg(dir.path())).await.unwrap();
        let mut expired = Chunk::new("fk:node:old", "fk", ChunkType::Node, json!({}));
        expired.expires = Some(Utc::now() - chrono::Duration::seconds(1));
        adapter.save(&expired).await.unwrap();
        let fresh = Chunk::new("fk:node:new", "fk", ChunkType::Node, json!({}));
        adapter.save(&fresh).await.unwrap();

        let evicted = adapter.cleanup().await.unwrap();
        assert_eq!(evicted, 1);
        assert!(adapter.has(&fresh.id).await.unwrap());
    }
}
