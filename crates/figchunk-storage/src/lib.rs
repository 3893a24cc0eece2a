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

//! Storage adapters for persisted [`Chunk`]s.
//!
//! A [`StorageAdapter`] is a uniform async persistence contract realized
//! by three very different backends:
//!
//! - [`local::FilesystemAdapter`] — hashed-directory sharding, atomic
//!   rename, lock files.
//! - [`kv::KvAdapter`] — Redis, `SETEX` + sorted-set indices by type,
//!   file, and the global id set.
//! - [`docstore::DocumentStoreAdapter`] — MongoDB, upsert + TTL index.
//!
//! [`manager::StorageManager`] is the name-keyed registry a
//! caller uses to register and look up adapters by name.

/// The document-store (MongoDB) adapter realization.
pub mod docstore;
/// Storage error taxonomy.
pub mod error;
/// The key-value (Redis) adapter realization.
pub mod kv;
/// The filesystem adapter realization.
pub mod local;
/// The `StorageManager` registry.
pub mod manager;
/// An in-memory adapter used by tests and the CLI's ad-hoc mode.
pub mod mock;
/// Shared JSON wire shape for the filesystem and KV adapters.
pub(crate) mod wire;

use async_trait::async_trait;
use figchunk_core::{Chunk, ChunkFilter, ChunkSummary};
use std::fmt::Debug;

pub use docstore::DocumentStoreAdapter;
pub use error::{StorageError, StorageResult};
pub use kv::KvAdapter;
pub use local::FilesystemAdapter;
pub use manager::StorageManager;
pub use mock::MockAdapter;

/// The uniform persistence contract every backend realizes.
///
/// All operations may fail with a [`StorageError::StorageTransient`] or
/// [`StorageError::StoragePermanent`] error; callers decide whether to
/// retry transient failures per their own policy. Implementations must
/// be `Send + Sync` — the surrounding server (the tool-call gateway, out
/// of scope here) uses adapters concurrently even though the chunker
/// itself does not.
#[async_trait]
pub trait StorageAdapter: Send + Sync + Debug {
    /// Upsert a chunk. Must be atomic with respect to concurrent readers
    /// — a reader never observes a torn write.
    async fn save(&self, chunk: &Chunk) -> StorageResult<()>;

    /// Fetch a chunk by id. Returns `Ok(None)` on miss or after silent
    /// expiry eviction. Updates `last_accessed` as a best-effort side
    /// effect; failures to do so are logged, not surfaced.
    async fn get(&self, id: &str) -> StorageResult<Option<Chunk>>;

    /// Existence check, without necessarily fetching the payload.
    async fn has(&self, id: &str) -> StorageResult<bool>;

    /// Delete a chunk. Returns `true` iff a chunk existed and is now
    /// gone.
    async fn delete(&self, id: &str) -> StorageResult<bool>;

    /// List chunk summaries matching `filter` (defaults applied when
    /// `None`), sorted and truncated per the filter.
    async fn list(&self, filter: Option<ChunkFilter>) -> StorageResult<Vec<ChunkSummary>>;

    /// Delete every chunk whose `expires` is in the past. Errors
    /// encountered per-item are logged and skipped, never surfaced to
    /// the caller.
    async fn cleanup(&self) -> StorageResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _check(_: &dyn StorageAdapter) {}
    }
}
