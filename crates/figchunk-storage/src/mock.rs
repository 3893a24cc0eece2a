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

//! In-memory storage adapter used by tests and the CLI's ad-hoc mode.
//!
//! Not one of the three persistent backends, but a fourth, dependency-free
//! realization of the same [`crate::StorageAdapter`] contract — useful
//! anywhere a real backend would be overkill (unit tests, a quick CLI
//! demo run with no filesystem/Redis/Mongo available).

use crate::error::StorageResult;
use crate::StorageAdapter;
use async_trait::async_trait;
use chrono::Utc;
use figchunk_core::{Chunk, ChunkFilter, ChunkSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe `Arc<RwLock<HashMap>>`-backed adapter.
#[derive(Debug, Clone, Default)]
pub struct MockAdapter {
    chunks: Arc<RwLock<HashMap<String, Chunk>>>,
}

impl MockAdapter {
    /// An empty adapter.
    pub fn new() -> Self {
        MockAdapter {
            chunks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of chunks currently stored, including expired ones not
    /// yet evicted by a read or a `cleanup()` sweep.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    /// Is the adapter empty?
    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

#[async_trait]
impl StorageAdapter for MockAdapter {
    async fn save(&self, chunk: &Chunk) -> StorageResult<()> {
        self.chunks.write().await.insert(chunk.id.clone(), chunk.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Chunk>> {
        let mut guard = self.chunks.write().await;
        let Some(chunk) = guard.get(id) else { return Ok(None) };
        if let Some(expires) = chunk.expires {
            if expires < Utc::now() {
                guard.remove(id);
                return Ok(None);
            }
        }
        let chunk = guard.get_mut(id).expect("just checked presence above");
        chunk.last_accessed = Utc::now();
        Ok(Some(chunk.clone()))
    }

    async fn has(&self, id: &str) -> StorageResult<bool> {
        let guard = self.chunks.read().await;
        Ok(guard
            .get(id)
            .map(|c| c.expires.map(|e| e >= Utc::now()).unwrap_or(true))
            .unwrap_or(false))
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        Ok(self.chunks.write().await.remove(id).is_some())
    }

    async fn list(&self, filter: Option<ChunkFilter>) -> StorageResult<Vec<ChunkSummary>> {
        let filter = filter.unwrap_or_default();
        let now = Utc::now();
        let guard = self.chunks.read().await;
        let mut summaries: Vec<ChunkSummary> = guard
            .values()
            .filter_map(|chunk| {
                let size = serde_json::to_vec(&chunk.data).map(|v| v.len()).unwrap_or(0);
                let summary = chunk.summary(size);
                filter.matches(&summary, chunk.expires, now).then_some(summary)
            })
            .collect();
        filter.sort(&mut summaries);
        summaries.truncate(filter.limit);
        Ok(summaries)
    }

    async fn cleanup(&self) -> StorageResult<usize> {
        let now = Utc::now();
        let mut guard = self.chunks.write().await;
        let before = guard.len();
        guard.retain(|_, chunk| chunk.expires.map(|e| e >= now).unwrap_or(true));
        Ok(before - guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figchunk_core::ChunkType;
    use serde_json::json;

    #[tokio::test]
    async fn invariant_4_save_then_get_roundtrips_modulo_last_accessed() {
        let adapter = MockAdapter::new();
        let chunk = Chunk::new("fk:node:a", "fk", ChunkType::Node, json!({"x": 1}));
        adapter.save(&chunk).await.unwrap();

        let fetched = adapter.get(&chunk.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, chunk.id);
        assert_eq!(fetched.data, chunk.data);
        assert_eq!(fetched.created, chunk.created);
    }

    #[tokio::test]
    async fn expired_chunk_is_evicted_on_read() {
        let adapter = MockAdapter::new();
        let mut chunk = Chunk::new("fk:node:a", "fk", ChunkType::Node, json!({}));
        chunk.expires = Some(Utc::now() - chrono::Duration::seconds(1));
        adapter.save(&chunk).await.unwrap();

        assert!(adapter.get(&chunk.id).await.unwrap().is_none());
        assert!(adapter.is_empty().await);
    }

    #[tokio::test]
    async fn cleanup_counts_evicted() {
        let adapter = MockAdapter::new();
        let mut expired = Chunk::new("fk:node:old", "fk", ChunkType::Node, json!({}));
        expired.expires = Some(Utc::now() - chrono::Duration::seconds(1));
        adapter.save(&expired).await.unwrap();
        let fresh = Chunk::new("fk:node:new", "fk", ChunkType::Node, json!({}));
        adapter.save(&fresh).await.unwrap();

        assert_eq!(adapter.cleanup().await.unwrap(), 1);
        assert_eq!(adapter.len().await, 1);
    }

    #[tokio::test]
    async fn list_respects_limit_and_sort() {
        let adapter = MockAdapter::new();
        for i in 0..5 {
            let chunk = Chunk::new(format!("fk:node:{i}"), "fk", ChunkType::Node, json!({}));
            adapter.save(&chunk).await.unwrap();
        }
        let mut filter = ChunkFilter::default();
        filter.limit = 2;
        filter.sort_by = figchunk_core::SortField::Id;
        filter.sort_direction = figchunk_core::SortDirection::Asc;
        let summaries = adapter.list(Some(filter)).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "fk:node:0");
    }
}
