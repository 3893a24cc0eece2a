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

//! Errors surfaced by [`crate::client::GatewayClient`].

use figchunk_core::ChunkError;
use figchunk_storage::StorageError;
use thiserror::Error;

/// Result type alias for gateway-client operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors the gateway boundary can surface. Wraps the two crates it
/// composes rather than inventing its own taxonomy, plus one condition
/// that only makes sense at this boundary: a fetched chunk that belongs
/// to a different file key than the caller asked for.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Error from the chunking engine.
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Error from the storage adapter.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The requested `chunk_id` exists but under a different `file_key`.
    #[error("chunk {chunk_id} belongs to file key {actual}, not {requested}")]
    FileKeyMismatch {
        chunk_id: String,
        requested: String,
        actual: String,
    },
}
