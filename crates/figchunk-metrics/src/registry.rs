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

//! Metrics registry for tracking chunker and storage-adapter operations.
//!
//! This is the *ambient* Prometheus exposition layer; it is distinct
//! from [`figchunk_core::MetricsCollector`], the
//! in-memory, dependency-free per-type bucket tracker the orchestrator
//! itself writes to on every `chunk()` call. [`MetricsRegistry::mirror_collector`]
//! is the only coupling between the two: it snapshots a collector's
//! buckets into Prometheus gauges for a running server process.

use figchunk_core::{ChunkType, MetricsCollector};
use prometheus::{Counter, CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;

use crate::types::{OptimizerStage, StorageBackendLabel, StorageOperation};

/// Central metrics registry for chunker and storage operations.
///
/// Thread-safe registry that can be cloned and shared across async tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<MetricsRegistryInner>,
}

struct MetricsRegistryInner {
    /// Prometheus registry.
    registry: Registry,

    // Storage adapter metrics.
    /// Duration of a storage operation, by backend and operation.
    storage_op_duration_seconds: HistogramVec,
    /// Count of storage operations, by backend, operation, and outcome
    /// (`success`/`error`).
    storage_op_total: CounterVec,
    /// Chunks evicted by a `cleanup()` sweep, by backend.
    cleanup_evicted_total: CounterVec,
    /// Stale filesystem locks reclaimed, i.e. a `LockUnavailable`
    /// downgraded to a warning rather than surfaced.
    lock_unavailable_total: Counter,

    // Chunker metrics (mirrors figchunk_core::MetricsCollector).
    /// Chunks produced, by chunk type.
    chunk_count_total: CounterVec,
    /// Serialized chunk size, by chunk type.
    chunk_size_bytes: HistogramVec,
    /// Wall time of a `Chunker::chunk()` call, by chunk type.
    chunk_duration_seconds: HistogramVec,
    /// Reference-graph cycles detected during chunking.
    cycles_detected_total: Counter,

    // Optimizer metrics.
    /// Chunk size before/after `ChunkOptimizer::optimize`, by stage.
    optimizer_size_bytes: HistogramVec,
}

impl MetricsRegistry {
    /// Build a fresh registry with every metric registered. Fails only
    /// if Prometheus rejects a metric descriptor (duplicate name),
    /// which cannot happen for a freshly constructed registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let storage_op_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "figchunk_storage_operation_duration_seconds",
                "Duration of a storage adapter operation",
            ),
            &["backend", "operation"],
        )?;
        let storage_op_total = CounterVec::new(
            Opts::new(
                "figchunk_storage_operation_total",
                "Count of storage adapter operations",
            ),
            &["backend", "operation", "outcome"],
        )?;
        let cleanup_evicted_total = CounterVec::new(
            Opts::new(
                "figchunk_cleanup_evicted_total",
                "Chunks evicted by a cleanup sweep",
            ),
            &["backend"],
        )?;
        let lock_unavailable_total = Counter::new(
            "figchunk_lock_unavailable_total",
            "Stale filesystem locks reclaimed or writes proceeding without a lock",
        )?;

        let chunk_count_total = CounterVec::new(
            Opts::new("figchunk_chunk_count_total", "Chunks produced by the chunker"),
            &["chunk_type"],
        )?;
        let chunk_size_bytes = HistogramVec::new(
            HistogramOpts::new("figchunk_chunk_size_bytes", "Serialized size of a produced chunk")
                .buckets(vec![256.0, 1024.0, 4096.0, 16384.0, 30720.0, 65536.0, 262144.0]),
            &["chunk_type"],
        )?;
        let chunk_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "figchunk_chunk_duration_seconds",
                "Wall time of a Chunker::chunk() call",
            ),
            &["chunk_type"],
        )?;
        let cycles_detected_total = Counter::new(
            "figchunk_cycles_detected_total",
            "Reference graph cycles detected across all chunk() calls",
        )?;

        let optimizer_size_bytes = HistogramVec::new(
            HistogramOpts::new(
                "figchunk_optimizer_size_bytes",
                "Chunk data size before/after an optimization pass",
            )
            .buckets(vec![256.0, 1024.0, 4096.0, 16384.0, 30720.0, 65536.0, 262144.0]),
            &["stage"],
        )?;

        registry.register(Box::new(storage_op_duration_seconds.clone()))?;
        registry.register(Box::new(storage_op_total.clone()))?;
        registry.register(Box::new(cleanup_evicted_total.clone()))?;
        registry.register(Box::new(lock_unavailable_total.clone()))?;
        registry.register(Box::new(chunk_count_total.clone()))?;
        registry.register(Box::new(chunk_size_bytes.clone()))?;
        registry.register(Box::new(chunk_duration_seconds.clone()))?;
        registry.register(Box::new(cycles_detected_total.clone()))?;
        registry.register(Box::new(optimizer_size_bytes.clone()))?;

        Ok(MetricsRegistry {
            inner: Arc::new(MetricsRegistryInner {
                registry,
                storage_op_duration_seconds,
                storage_op_total,
                cleanup_evicted_total,
                lock_unavailable_total,
                chunk_count_total,
                chunk_size_bytes,
                chunk_duration_seconds,
                cycles_detected_total,
                optimizer_size_bytes,
            }),
        })
    }

    /// The underlying Prometheus registry, for `gather()`.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record one storage operation's duration and outcome.
    pub fn record_storage_operation(
        &self,
        backend: StorageBackendLabel,
        operation: StorageOperation,
        duration_secs: f64,
        success: bool,
    ) {
        self.inner
            .storage_op_duration_seconds
            .with_label_values(&[backend.as_label(), operation.as_label()])
            .observe(duration_secs);
        let outcome = if success { "success" } else { "error" };
        self.inner
            .storage_op_total
            .with_label_values(&[backend.as_label(), operation.as_label(), outcome])
            .inc();
    }

    /// Record chunks evicted by a backend's `cleanup()` sweep.
    pub fn record_cleanup_evicted(&self, backend: StorageBackendLabel, count: u64) {
        self.inner
            .cleanup_evicted_total
            .with_label_values(&[backend.as_label()])
            .inc_by(count as f64);
    }

    /// Record a stale lock reclaim or a write proceeding without a lock.
    pub fn record_lock_unavailable(&self) {
        self.inner.lock_unavailable_total.inc();
    }

    /// Record one chunk produced by the chunker.
    pub fn record_chunk(&self, chunk_type: ChunkType, size_bytes: u64) {
        self.inner
            .chunk_count_total
            .with_label_values(&[chunk_type.as_str()])
            .inc();
        self.inner
            .chunk_size_bytes
            .with_label_values(&[chunk_type.as_str()])
            .observe(size_bytes as f64);
    }

    /// Record the wall time of one `Chunker::chunk()` call.
    pub fn record_chunk_duration(&self, chunk_type: ChunkType, duration_secs: f64) {
        self.inner
            .chunk_duration_seconds
            .with_label_values(&[chunk_type.as_str()])
            .observe(duration_secs);
    }

    /// Record that cycle detection found one or more cycles.
    pub fn record_cycles_detected(&self) {
        self.inner.cycles_detected_total.inc();
    }

    /// Record a chunk's size before or after an optimization pass.
    pub fn record_optimizer_size(&self, stage: OptimizerStage, size_bytes: u64) {
        self.inner
            .optimizer_size_bytes
            .with_label_values(&[stage.as_label()])
            .observe(size_bytes as f64);
    }

    /// Snapshot a [`figchunk_core::MetricsCollector`]'s dense per-type
    /// buckets into this registry's chunk metrics. The collector is the
    /// source of truth for in-process statistics; this mirrors it for a
    /// server process that wants a running Prometheus view as well.
    /// Only sizes recorded since the collector's
    /// last `reset()` are reflected — repeated calls double-count,
    /// callers are expected to mirror once per collector lifetime.
    pub fn mirror_collector(&self, collector: &MetricsCollector) {
        let stats = collector.statistics();
        for chunk_type in ChunkType::all() {
            let Some(type_stats) = stats.per_type.get(&chunk_type) else {
                continue;
            };
            for &size in &type_stats.chunk_size_bytes {
                self.inner
                    .chunk_size_bytes
                    .with_label_values(&[chunk_type.as_str()])
                    .observe(size as f64);
            }
            for &ms in &type_stats.processing_time_ms {
                self.inner
                    .chunk_duration_seconds
                    .with_label_values(&[chunk_type.as_str()])
                    .observe(ms / 1000.0);
            }
        }
    }
}
