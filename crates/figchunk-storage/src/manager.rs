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

//! `StorageManager` — a name-keyed adapter registry.

use crate::error::{StorageError, StorageResult};
use crate::StorageAdapter;
use figchunk_core::{Chunk, ChunkFilter, ChunkSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Registry of named [`StorageAdapter`]s with a configurable default.
///
/// Thin delegation methods forward to `adapter(None)` (the configured
/// default); [`StorageManager::cleanup_all`] fans a sweep out to every
/// registered adapter concurrently.
pub struct StorageManager {
    adapters: HashMap<String, Arc<dyn StorageAdapter>>,
    default_name: Option<String>,
}

impl StorageManager {
    /// An empty registry with no default adapter set.
    pub fn new() -> Self {
        StorageManager {
            adapters: HashMap::new(),
            default_name: None,
        }
    }

    /// Register `adapter` under `name`. The first adapter registered
    /// becomes the default; call [`Self::set_default`] to change it.
    pub fn register(&mut self, name: impl Into<String>, adapter: Arc<dyn StorageAdapter>) {
        let name = name.into();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.adapters.insert(name, adapter);
    }

    /// Change which registered adapter `adapter(None)` resolves to.
    pub fn set_default(&mut self, name: impl Into<String>) -> StorageResult<()> {
        let name = name.into();
        if !self.adapters.contains_key(&name) {
            return Err(StorageError::permanent(format!("no adapter registered as '{name}'")));
        }
        self.default_name = Some(name);
        Ok(())
    }

    /// Look up an adapter by name, or the configured default when
    /// `name` is `None`.
    pub fn adapter(&self, name: Option<&str>) -> StorageResult<Arc<dyn StorageAdapter>> {
        let resolved = match name {
            Some(n) => n,
            None => self
                .default_name
                .as_deref()
                .ok_or_else(|| StorageError::permanent("no default adapter configured"))?,
        };
        self.adapters
            .get(resolved)
            .cloned()
            .ok_or_else(|| StorageError::permanent(format!("no adapter registered as '{resolved}'")))
    }

    /// Every registered adapter name.
    pub fn names(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Delegate to the default adapter's `save`.
    pub async fn save(&self, chunk: &Chunk) -> StorageResult<()> {
        self.adapter(None)?.save(chunk).await
    }

    /// Delegate to the default adapter's `get`.
    pub async fn get(&self, id: &str) -> StorageResult<Option<Chunk>> {
        self.adapter(None)?.get(id).await
    }

    /// Delegate to the default adapter's `has`.
    pub async fn has(&self, id: &str) -> StorageResult<bool> {
        self.adapter(None)?.has(id).await
    }

    /// Delegate to the default adapter's `delete`.
    pub async fn delete(&self, id: &str) -> StorageResult<bool> {
        self.adapter(None)?.delete(id).await
    }

    /// Delegate to the default adapter's `list`.
    pub async fn list(&self, filter: Option<ChunkFilter>) -> StorageResult<Vec<ChunkSummary>> {
        self.adapter(None)?.list(filter).await
    }

    /// Run `cleanup()` on every registered adapter concurrently,
    /// returning the total number of evicted chunks. A single
    /// adapter's failure is logged and does not stop the others.
    pub async fn cleanup_all(&self) -> usize {
        let futures = self.adapters.iter().map(|(name, adapter)| {
            let name = name.clone();
            let adapter = Arc::clone(adapter);
            async move {
                match adapter.cleanup().await {
                    Ok(n) => n,
                    Err(e) => {
                        warn!(adapter = %name, error = %e, "cleanup failed");
                        0
                    }
                }
            }
        });
        futures_util::future::join_all(futures).await.into_iter().sum()
    }

    /// Release held resources and clear the registry. Adapters in this
    /// demo crate hold no explicit close hooks (connections are dropped
    /// with their `Arc`); this simply empties the map so no further
    /// lookups succeed.
    pub fn dispose(&mut self) {
        self.adapters.clear();
        self.default_name = None;
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
