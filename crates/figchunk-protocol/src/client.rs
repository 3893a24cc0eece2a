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

//! [`GatewayClient`] — the thin facade the out-of-scope tool-call
//! gateway composes against. It realizes the two boundary operations —
//! ingest and fetch — by gluing a [`Chunker`] to a [`StorageAdapter`];
//! it does not speak RPC/SSE or any other transport.

use std::sync::Arc;

use figchunk_core::{Chunker, ChunkFilter, ChunkType};
use figchunk_storage::StorageAdapter;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{GatewayError, GatewayResult};
use crate::types::{FetchResponse, IngestResponse, StructureSummary};

/// Composes a [`Chunker`] with a [`StorageAdapter`] to realize "ingest
/// document" / "fetch chunk" for a single caller. Not `Send`/`Sync`:
/// the chunker's reference graph and metrics collector are confined to
/// one task by contract, so a gateway serving many concurrent
/// requests owns one `GatewayClient` per task rather than sharing one.
pub struct GatewayClient {
    chunker: Chunker,
    storage: Arc<dyn StorageAdapter>,
}

impl GatewayClient {
    /// Build a client around an already-configured chunker and a
    /// storage adapter (typically looked up from a `StorageManager` by
    /// the caller).
    pub fn new(chunker: Chunker, storage: Arc<dyn StorageAdapter>) -> Self {
        Self { chunker, storage }
    }

    /// "Ingest document": chunk `data` under `file_key`, persist every
    /// produced chunk, and summarize the result for the gateway.
    ///
    /// A failed call leaves no partial state when the failure happens during chunking
    /// (nothing is persisted yet); a failure partway through persisting
    /// may leave earlier chunks saved, and retrying with the same
    /// `file_key`/`data` is safe because saves upsert.
    pub async fn ingest(&self, file_key: &str, data: &Value, chunk_type: Option<ChunkType>) -> GatewayResult<IngestResponse> {
        let result = self.chunker.chunk(data, file_key, chunk_type).await?;
        info!(file_key, chunks = result.chunks.len(), "ingesting document");

        let metadata = result
            .chunks
            .iter()
            .find(|c| c.chunk_type == ChunkType::Metadata)
            .map(|c| c.data.clone());

        for chunk in &result.chunks {
            self.storage.save(chunk).await?;
        }

        Ok(IngestResponse {
            file_key: file_key.to_string(),
            first_chunk_id: result.primary_chunk_id.clone(),
            total_chunks: result.chunks.len(),
            metadata,
            structure_summary: StructureSummary::from_chunks(&result.chunks, &result.references),
        })
    }

    /// "Fetch chunk": look up `chunk_id` and unpack it into a
    /// [`FetchResponse`]. Returns `Ok(None)` on miss, mirroring
    /// `StorageAdapter::get`'s own absent-on-expiry semantics.
    pub async fn fetch(&self, file_key: &str, chunk_id: &str) -> GatewayResult<Option<FetchResponse>> {
        debug!(file_key, chunk_id, "fetching chunk");
        let Some(chunk) = self.storage.get(chunk_id).await? else {
            return Ok(None);
        };

        if chunk.file_key != file_key {
            return Err(GatewayError::FileKeyMismatch {
                chunk_id: chunk_id.to_string(),
                requested: file_key.to_string(),
                actual: chunk.file_key,
            });
        }

        let total_chunks = self
            .storage
            .list(Some(ChunkFilter {
                file_key: Some(file_key.to_string()),
                include_expired: true,
                limit: usize::MAX,
                ..Default::default()
            }))
            .await?
            .len();

        Ok(Some(FetchResponse::from_chunk(&chunk, total_chunks)))
    }
}
