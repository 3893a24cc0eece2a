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

//! Shared JSON wire shape for backends that persist chunks as opaque
//! JSON blobs (filesystem, KV). The sentinel wrapper round-trips
//! timestamps exactly through both adapters, so both serialize through
//! [`PersistedChunk`] rather than relying on `chrono`'s default string
//! encoding.

use chrono::{DateTime, Utc};
use figchunk_core::{Chunk, ChunkType};
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Sentinel-wrapped timestamp: `{"__date":true,"value":"<ISO-8601>"}`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DateSentinel(pub DateTime<Utc>);

impl Serialize for DateSentinel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("__date", &true)?;
        map.serialize_entry("value", &self.0.to_rfc3339())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for DateSentinel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[allow(dead_code)]
            __date: bool,
            value: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        let dt = DateTime::parse_from_rfc3339(&raw.value)
            .map_err(D::Error::custom)?
            .with_timezone(&Utc);
        Ok(DateSentinel(dt))
    }
}

/// On-disk/on-wire shape of a chunk. Readers must accept a missing
/// `expires` and an absent/empty `links`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PersistedChunk {
    pub id: String,
    pub file_key: String,
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,
    pub created: DateSentinel,
    pub last_accessed: DateSentinel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateSentinel>,
    pub data: Value,
    #[serde(default)]
    pub links: Vec<String>,
}

impl From<&Chunk> for PersistedChunk {
    fn from(c: &Chunk) -> Self {
        PersistedChunk {
            id: c.id.clone(),
            file_key: c.file_key.clone(),
            chunk_type: c.chunk_type,
            created: DateSentinel(c.created),
            last_accessed: DateSentinel(c.last_accessed),
            expires: c.expires.map(DateSentinel),
            data: c.data.clone(),
            links: c.links.clone(),
        }
    }
}

impl From<PersistedChunk> for Chunk {
    fn from(p: PersistedChunk) -> Self {
        Chunk {
            id: p.id,
            file_key: p.file_key,
            chunk_type: p.chunk_type,
            created: p.created.0,
            last_accessed: p.last_accessed.0,
            expires: p.expires.map(|d| d.0),
            data: p.data,
            links: p.links,
        }
    }
}
