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

//! The two request/response pairs the tool-call gateway consumes at
//! its boundary with the chunking engine. These are plain data — no
//! transport framing, which is the gateway's job.

use figchunk_core::{Chunk, ChunkType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Request to ingest a whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Opaque identifier of the source document.
    pub file_key: String,
    /// The raw document to chunk: a root node tree, a metadata envelope,
    /// or a global-variables dictionary, auto-detected by the chunker
    /// when `chunk_type` is absent.
    pub data: Value,
    /// Force a specific strategy instead of auto-detecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<ChunkType>,
}

/// Per-type chunk counts produced by one ingest call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureSummary {
    /// Number of chunks produced per chunk type.
    pub counts: HashMap<ChunkType, usize>,
    /// Total number of distinct ids reachable from the primary chunk.
    pub reference_count: usize,
}

impl StructureSummary {
    /// Build a summary from the chunks and references of one
    /// `ChunkResult`.
    pub fn from_chunks(chunks: &[Chunk], references: &[String]) -> Self {
        let mut counts = HashMap::new();
        for chunk in chunks {
            *counts.entry(chunk.chunk_type).or_insert(0) += 1;
        }
        StructureSummary {
            counts,
            reference_count: references.len(),
        }
    }
}

/// Response to "ingest document": `chunk(data, fileKey)`
/// followed by persisting every produced chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Echoes the request's `file_key`.
    pub file_key: String,
    /// Id of the primary (entry-point) chunk — what a subsequent
    /// "fetch chunk" call should ask for first.
    pub first_chunk_id: String,
    /// Total number of chunks persisted for this document.
    pub total_chunks: usize,
    /// The metadata chunk's payload, if the document produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Per-type chunk counts and reference-graph size.
    pub structure_summary: StructureSummary,
}

/// Request to fetch a single chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Source document key; cross-checked against the fetched chunk.
    pub file_key: String,
    /// Id of the chunk to fetch.
    pub chunk_id: String,
}

/// Response to "fetch chunk": `get(fileKey, chunkId)`
/// unpacked by chunk type so the gateway doesn't need to branch on
/// payload shape itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Echoes the request's `file_key`.
    pub file_key: String,
    /// Echoes the request's `chunk_id`.
    pub chunk_id: String,
    /// First of the chunk's own links, offered as a pagination hint for
    /// gateways that walk chunks sequentially rather than following the
    /// full reference graph. `None` when the chunk has no links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_chunk_id: Option<String>,
    /// Total number of chunks persisted under this file key, as of the
    /// fetch (a cheap `list` count, not a point-in-time snapshot
    /// guarantee).
    pub total_chunks: usize,
    /// The payload, present when `chunk_type == Metadata`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// The payload, present when `chunk_type == GlobalVars`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_vars: Option<Value>,
    /// The payload wrapped in a single-element vec, present when
    /// `chunk_type == Node`. A vec (rather than `Option<Value>`) to
    /// leave room for a gateway that batches sibling nodes into one
    /// response without changing this shape.
    #[serde(default)]
    pub nodes: Vec<Value>,
}

impl FetchResponse {
    /// Build a response from a fetched chunk, branching its payload
    /// into the right field by `chunk_type`.
    pub fn from_chunk(chunk: &Chunk, total_chunks: usize) -> Self {
        let mut response = FetchResponse {
            file_key: chunk.file_key.clone(),
            chunk_id: chunk.id.clone(),
            next_chunk_id: chunk.links.first().cloned(),
            total_chunks,
            metadata: None,
            global_vars: None,
            nodes: Vec::new(),
        };
        match chunk.chunk_type {
            ChunkType::Metadata => response.metadata = Some(chunk.data.clone()),
            ChunkType::GlobalVars => response.global_vars = Some(chunk.data.clone()),
            ChunkType::Node => response.nodes.push(chunk.data.clone()),
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_chunk(chunk_type: ChunkType) -> Chunk {
        Chunk {
            id: "file1:node:abc".to_string(),
            file_key: "file1".to_string(),
            chunk_type,
            created: Utc::now(),
            last_accessed: Utc::now(),
            expires: None,
            data: serde_json::json!({"hello": "world"}),
            links: vec!["file1:node:def".to_string()],
        }
    }

    #[test]
    fn fetch_response_unpacks_node_payload() {
        let chunk = sample_chunk(ChunkType::Node);
        let response = FetchResponse::from_chunk(&chunk, 3);
        assert_eq!(response.nodes.len(), 1);
        assert!(response.metadata.is_none());
        assert!(response.global_vars.is_none());
        assert_eq!(response.next_chunk_id.as_deref(), Some("file1:node:def"));
    }

    #[test]
    fn fetch_response_unpacks_metadata_payload() {
        let chunk = sample_chunk(ChunkType::Metadata);
        let response = FetchResponse::from_chunk(&chunk, 1);
        assert!(response.nodes.is_empty());
        assert!(response.metadata.is_some());
    }

    #[test]
    fn fetch_response_unpacks_global_vars_payload() {
        let chunk = sample_chunk(ChunkType::GlobalVars);
        let response = FetchResponse::from_chunk(&chunk, 1);
        assert!(response.nodes.is_empty());
        assert!(response.global_vars.is_some());
    }

    #[test]
    fn structure_summary_counts_by_type() {
        let chunks = vec![sample_chunk(ChunkType::Node), sample_chunk(ChunkType::Metadata)];
        let references = vec!["file1:node:def".to_string()];
        let summary = StructureSummary::from_chunks(&chunks, &references);
        assert_eq!(summary.counts.get(&ChunkType::Node), Some(&1));
        assert_eq!(summary.counts.get(&ChunkType::Metadata), Some(&1));
        assert_eq!(summary.reference_count, 1);
    }

    #[test]
    fn ingest_request_round_trips() {
        let request = IngestRequest {
            file_key: "file1".to_string(),
            data: serde_json::json!({"id": "1"}),
            chunk_type: Some(ChunkType::Node),
        };
        let json = serde_json::to_string(&request).unwrap();
        let deserialized: IngestRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.file_key, deserialized.file_key);
        assert_eq!(request.chunk_type, deserialized.chunk_type);
    }
}
