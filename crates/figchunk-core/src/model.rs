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

//! The persisted chunk shape, its listing projection, and query filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three chunk type tags. Wire/id representation matches §6 exactly:
/// `metadata`, `node`, `globalVars` (the middle one keeps its capital V —
/// "rendered in lowercase" in the id generator refers to not
/// title-casing the variant, not to flattening `globalVars`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChunkType {
    /// The document metadata envelope.
    Metadata,
    /// A node subtree.
    Node,
    /// The global design-variable dictionary.
    GlobalVars,
}

impl ChunkType {
    /// The wire-stable lowercase/camelCase string for this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkType::Metadata => "metadata",
            ChunkType::Node => "node",
            ChunkType::GlobalVars => "globalVars",
        }
    }

    /// Parse the wire string back into a variant. Case-sensitive: the id
    /// format is stable across versions, so we don't normalize case here.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "metadata" => Some(ChunkType::Metadata),
            "node" => Some(ChunkType::Node),
            "globalVars" => Some(ChunkType::GlobalVars),
            _ => None,
        }
    }

    /// All known variants, in a stable order. Used to seed dense
    /// per-type maps (metrics buckets, globalvars index groups).
    pub fn all() -> [ChunkType; 3] {
        [ChunkType::Metadata, ChunkType::Node, ChunkType::GlobalVars]
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fundamental persisted entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// `fileKey:type:identifier`.
    pub id: String,
    /// Opaque identifier of the source document.
    pub file_key: String,
    /// Which strategy produced this chunk.
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,
    /// Creation timestamp, millisecond resolution.
    pub created: DateTime<Utc>,
    /// Last-read timestamp; `>= created`.
    pub last_accessed: DateTime<Utc>,
    /// Optional expiry; adapters may apply a default TTL when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// The chunk payload; shape depends on `chunk_type`.
    pub data: Value,
    /// Ids this chunk directly depends on. Transport-level ordered
    /// multiset; duplicates are ignored by graph operations.
    #[serde(default)]
    pub links: Vec<String>,
}

impl Chunk {
    /// Construct a chunk with `created == last_accessed == now` and no
    /// expiry, the shape every strategy produces before storage adapters
    /// apply their own defaults.
    pub fn new(id: impl Into<String>, file_key: impl Into<String>, chunk_type: ChunkType, data: Value) -> Self {
        let now = Utc::now();
        Chunk {
            id: id.into(),
            file_key: file_key.into(),
            chunk_type,
            created: now,
            last_accessed: now,
            expires: None,
            data,
            links: Vec::new(),
        }
    }

    /// Listing projection.
    pub fn summary(&self, size: usize) -> ChunkSummary {
        ChunkSummary {
            id: self.id.clone(),
            file_key: self.file_key.clone(),
            chunk_type: self.chunk_type,
            created: self.created,
            size,
        }
    }
}

/// Projection used for listings; carries no payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSummary {
    /// Chunk id.
    pub id: String,
    /// Source document key.
    pub file_key: String,
    /// Chunk type.
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Serialized size in bytes, as estimated at listing time.
    pub size: usize,
}

/// Sort keys accepted by `ChunkFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Sort by chunk id, lexicographically.
    Id,
    /// Sort by source document key.
    FileKey,
    /// Sort by chunk type.
    Type,
    /// Sort by creation timestamp (default).
    Created,
    /// Sort by serialized size.
    Size,
}

/// Sort direction, descending by default (newest/largest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order (default).
    Desc,
}

/// Query filter for `StorageAdapter::list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkFilter {
    /// Restrict to chunks with this source document key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
    /// Restrict to chunks of this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<ChunkType>,
    /// Restrict to chunks created strictly before this timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub older_than: Option<DateTime<Utc>>,
    /// Restrict to chunks created strictly after this timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newer_than: Option<DateTime<Utc>>,
    /// Include chunks past their `expires` timestamp. Default `false`.
    #[serde(default)]
    pub include_expired: bool,
    /// Maximum number of summaries to return. Default `100`.
    #[serde(default = "ChunkFilter::default_limit")]
    pub limit: usize,
    /// Sort key. Default `Created`.
    #[serde(default = "ChunkFilter::default_sort_by")]
    pub sort_by: SortField,
    /// Sort direction. Default `Desc`.
    #[serde(default = "ChunkFilter::default_sort_direction")]
    pub sort_direction: SortDirection,
}

impl ChunkFilter {
    fn default_limit() -> usize {
        100
    }

    fn default_sort_by() -> SortField {
        SortField::Created
    }

    fn default_sort_direction() -> SortDirection {
        SortDirection::Desc
    }

    /// Does `summary` (with its originating chunk's `expires`, for the
    /// expiry predicate) satisfy every predicate in this filter?
    pub fn matches(&self, summary: &ChunkSummary, expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        if let Some(ref fk) = self.file_key {
            if &summary.file_key != fk {
                return false;
            }
        }
        if let Some(t) = self.chunk_type {
            if summary.chunk_type != t {
                return false;
            }
        }
        if let Some(older) = self.older_than {
            if !(summary.created < older) {
                return false;
            }
        }
        if let Some(newer) = self.newer_than {
            if !(summary.created > newer) {
                return false;
            }
        }
        if !self.include_expired {
            if let Some(exp) = expires {
                if exp <= now {
                    return false;
                }
            }
        }
        true
    }

    /// Sort a mutable slice of summaries per `sort_by`/`sort_direction`,
    /// then truncate conceptually to `limit` (callers do the truncation
    /// since this takes a slice, not a `Vec`).
    pub fn sort(&self, summaries: &mut [ChunkSummary]) {
        summaries.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortField::Id => a.id.cmp(&b.id),
                SortField::FileKey => a.file_key.cmp(&b.file_key),
                SortField::Type => a.chunk_type.as_str().cmp(b.chunk_type.as_str()),
                SortField::Created => a.created.cmp(&b.created),
                SortField::Size => a.size.cmp(&b.size),
            };
            match self.sort_direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }
}

impl Default for ChunkFilter {
    fn default() -> Self {
        ChunkFilter {
            file_key: None,
            chunk_type: None,
            older_than: None,
            newer_than: None,
            include_expired: false,
            limit: Self::default_limit(),
            sort_by: Self::default_sort_by(),
            sort_direction: Self::default_sort_direction(),
        }
    }
}

/// The output of one chunking invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Every chunk produced, topologically ordered with the primary
    /// first.
    pub chunks: Vec<Chunk>,
    /// The id of the primary (caller-visible entry point) chunk.
    pub primary_chunk_id: String,
    /// Deduplicated set of ids reachable from the primary, excluding
    /// the primary itself.
    pub references: Vec<String>,
}

impl ChunkResult {
    /// The primary chunk, looked up by id. Panics only if the invariant
    /// that `primary_chunk_id` is present in `chunks` was violated by
    /// whoever constructed this result — that's a strategy bug, not a
    /// caller-facing condition.
    pub fn primary(&self) -> &Chunk {
        self.chunks
            .iter()
            .find(|c| c.id == self.primary_chunk_id)
            .expect("primary_chunk_id must name a chunk in chunks")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_type_wire_strings() {
        assert_eq!(ChunkType::Metadata.as_str(), "metadata");
        assert_eq!(ChunkType::Node.as_str(), "node");
        assert_eq!(ChunkType::GlobalVars.as_str(), "globalVars");
    }

    #[test]
    fn chunk_type_parse_roundtrip() {
        for t in ChunkType::all() {
            assert_eq!(ChunkType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ChunkType::parse("bogus"), None);
    }

    #[test]
    fn filter_defaults() {
        let f = ChunkFilter::default();
        assert_eq!(f.limit, 100);
        assert_eq!(f.sort_by, SortField::Created);
        assert_eq!(f.sort_direction, SortDirection::Desc);
        assert!(!f.include_expired);
    }

    #[test]
    fn filter_excludes_expired_by_default() {
        let now = Utc::now();
        let summary = ChunkSummary {
            id: "a:node:1".into(),
            file_key: "a".into(),
            chunk_type: ChunkType::Node,
            created: now,
            size: 10,
        };
        let filter = ChunkFilter::default();
        assert!(!filter.matches(&summary, Some(now - chrono::Duration::seconds(1)), now));
        assert!(filter.matches(&summary, Some(now + chrono::Duration::seconds(1)), now));
    }
}
