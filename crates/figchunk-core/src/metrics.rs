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

//! In-memory, dependency-free per-type metrics bucket.
//!
//! This is deliberately not the Prometheus-backed `figchunk-metrics`
//! crate's `MetricsRegistry` — it's the plain bucket tracker the
//! orchestrator writes to directly on every `chunk()` call, with no
//! exposition format or HTTP server attached. `figchunk-metrics` may
//! mirror a snapshot of this into Prometheus gauges, but the two are
//! independent.

use crate::model::ChunkType;
use std::collections::HashMap;

/// Raw per-type measurements plus a running chunk count.
#[derive(Debug, Clone, Default)]
pub struct TypeBucket {
    /// Wall-clock processing time recorded per `chunk()` call, ms.
    pub processing_time_ms: Vec<f64>,
    /// Serialized size recorded per chunk produced, bytes.
    pub chunk_size_bytes: Vec<u64>,
    /// Count of chunks produced of this type.
    pub chunk_count: u64,
}

/// Derived per-type statistics returned by `statistics()`.
#[derive(Debug, Clone)]
pub struct TypeStats {
    /// Same data as the bucket, for callers that want the raw samples.
    pub processing_time_ms: Vec<f64>,
    /// Same data as the bucket, for callers that want the raw samples.
    pub chunk_size_bytes: Vec<u64>,
    /// Chunk count for this type.
    pub chunk_count: u64,
    /// Arithmetic mean of `processing_time_ms`; `0.0` when empty.
    pub avg_processing_time_ms: f64,
    /// Arithmetic mean of `chunk_size_bytes`; `0.0` when empty.
    pub avg_chunk_size_bytes: f64,
}

/// Snapshot returned by `MetricsCollector::statistics`.
#[derive(Debug, Clone)]
pub struct MetricsStatistics {
    /// Dense map — every known `ChunkType` has an entry, even if empty.
    pub per_type: HashMap<ChunkType, TypeStats>,
    /// Sum of `chunk_count` across all types.
    pub total_count: u64,
}

/// Per-type bucket tracker. Not thread-safe by contract;
/// methods take `&mut self` and callers are responsible for confining
/// an instance to a single task or wrapping it in their own lock.
#[derive(Debug)]
pub struct MetricsCollector {
    buckets: HashMap<ChunkType, TypeBucket>,
}

impl MetricsCollector {
    /// A new collector with a dense (but empty) bucket for every type.
    pub fn new() -> Self {
        let mut buckets = HashMap::new();
        for t in ChunkType::all() {
            buckets.insert(t, TypeBucket::default());
        }
        MetricsCollector { buckets }
    }

    /// Append a processing-time sample for `chunk_type`.
    pub fn record_time(&mut self, chunk_type: ChunkType, ms: f64) {
        self.buckets.entry(chunk_type).or_default().processing_time_ms.push(ms);
    }

    /// Append a chunk-size sample for `chunk_type`.
    pub fn record_size(&mut self, chunk_type: ChunkType, bytes: u64) {
        self.buckets.entry(chunk_type).or_default().chunk_size_bytes.push(bytes);
    }

    /// Increment the chunk count for `chunk_type`.
    pub fn record_chunk(&mut self, chunk_type: ChunkType) {
        self.buckets.entry(chunk_type).or_default().chunk_count += 1;
    }

    /// Snapshot raw arrays, per-type averages, per-type counts, and the
    /// sum of counts across every type.
    pub fn statistics(&self) -> MetricsStatistics {
        let mut per_type = HashMap::new();
        let mut total_count = 0u64;

        for t in ChunkType::all() {
            let bucket = self.buckets.get(&t).cloned().unwrap_or_default();
            let avg_processing_time_ms = average(&bucket.processing_time_ms);
            let avg_chunk_size_bytes = average_u64(&bucket.chunk_size_bytes);
            total_count += bucket.chunk_count;

            per_type.insert(
                t,
                TypeStats {
                    processing_time_ms: bucket.processing_time_ms,
                    chunk_size_bytes: bucket.chunk_size_bytes,
                    chunk_count: bucket.chunk_count,
                    avg_processing_time_ms,
                    avg_chunk_size_bytes,
                },
            );
        }

        MetricsStatistics { per_type, total_count }
    }

    /// Empty every bucket. Dense map for every known type survives the
    /// reset, just with empty contents.
    pub fn reset(&mut self) {
        self.buckets.clear();
        for t in ChunkType::all() {
            self.buckets.insert(t, TypeBucket::default());
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        MetricsCollector::new()
    }
}

fn average(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

fn average_u64(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<u64>() as f64 / samples.len() as f64
    }
}
