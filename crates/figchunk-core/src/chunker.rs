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

//! The orchestrator: type detection, strategy dispatch, post-processing,
//! metrics.

use crate::context::ChunkingContext;
use crate::error::{ChunkError, Result};
use crate::metrics::MetricsCollector;
use crate::model::{ChunkResult, ChunkType};
use crate::optimizer::{ChunkOptimizer, OptimizationLevel};
use crate::reference_graph::ReferenceGraph;
use crate::strategy::{ChunkStrategy, GlobalVarsStrategy, MetadataStrategy, NodeStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

/// A recoverable anomaly surfaced through the warning channel rather
/// than as an error.
#[derive(Debug, Clone)]
pub enum Warning {
    /// `detect_circular_references` found one or more cycles.
    CyclesDetected(Vec<Vec<String>>),
}

/// Chunker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Byte budget per chunk. Default `30720`.
    pub max_chunk_size: usize,
    /// Emit debug-level tracing for per-call bookkeeping. Default `false`.
    pub debug: bool,
    /// Optimization level applied after strategy dispatch. Default `MEDIUM`.
    pub optimization_level: OptimizationLevel,
    /// Record wall time / chunk counts / sizes into the in-memory
    /// metrics collector. Default `false`.
    pub collect_metrics: bool,
    /// Run cycle detection over the reference graph after each call.
    /// Default `true`.
    pub detect_circular_references: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        ChunkerConfig {
            max_chunk_size: 30_720,
            debug: false,
            optimization_level: OptimizationLevel::Medium,
            collect_metrics: false,
            detect_circular_references: true,
        }
    }
}

/// The chunking engine: strategy registry, owned reference graph, owned
/// metrics collector. Not thread-safe by contract — a caller
/// invoking it from many tasks must either give each task its own
/// `Chunker` or wrap this one in a lock.
pub struct Chunker {
    config: ChunkerConfig,
    strategies: HashMap<ChunkType, Box<dyn ChunkStrategy>>,
    graph: RefCell<ReferenceGraph>,
    metrics: RefCell<MetricsCollector>,
    warnings: RefCell<Vec<Warning>>,
}

impl Chunker {
    /// Build a `Chunker` with the default strategy registry (node,
    /// metadata, globalVars) and the given configuration.
    pub fn new(config: ChunkerConfig) -> Self {
        let mut strategies: HashMap<ChunkType, Box<dyn ChunkStrategy>> = HashMap::new();
        strategies.insert(ChunkType::Node, Box::new(NodeStrategy::new()));
        strategies.insert(ChunkType::Metadata, Box::new(MetadataStrategy::new()));
        strategies.insert(ChunkType::GlobalVars, Box::new(GlobalVarsStrategy::new()));

        Chunker {
            config,
            strategies,
            graph: RefCell::new(ReferenceGraph::new()),
            metrics: RefCell::new(MetricsCollector::new()),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Register or replace the strategy for `chunk_type`.
    pub fn register_strategy(&mut self, chunk_type: ChunkType, strategy: Box<dyn ChunkStrategy>) {
        self.strategies.insert(chunk_type, strategy);
    }

    /// Read-only access to the accumulated reference graph.
    pub fn reference_graph(&self) -> std::cell::Ref<'_, ReferenceGraph> {
        self.graph.borrow()
    }

    /// Read-only access to the in-memory metrics collector.
    pub fn metrics(&self) -> std::cell::Ref<'_, MetricsCollector> {
        self.metrics.borrow()
    }

    /// Warnings accumulated across every `chunk()` call so far (cycle
    /// reports, currently the only kind).
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    /// Detect the chunk type for `data` using structural heuristics: a
    /// `variables`/`localVariables` collection
    /// implies `globalVars`; `{id, type: string}` or a `document.id` +
    /// `document.children` pair implies `node`; `{name, schemaVersion}`
    /// or `{name, lastModified, version}` implies `metadata`; otherwise
    /// `metadata` is the default.
    pub fn detect_type(data: &Value) -> ChunkType {
        let has_variable_collection = data
            .get("variables")
            .or_else(|| data.get("localVariables"))
            .map(|v| v.is_object() || v.is_array())
            .unwrap_or(false);
        if has_variable_collection {
            return ChunkType::GlobalVars;
        }

        let has_node_shape = (data.get("id").and_then(Value::as_str).is_some() && data.get("type").and_then(Value::as_str).is_some())
            || (data.get("document").and_then(|d| d.get("id")).is_some()
                && data.get("document").and_then(|d| d.get("children")).is_some());
        if has_node_shape {
            return ChunkType::Node;
        }

        let has_metadata_shape = (data.get("name").is_some() && data.get("schemaVersion").is_some())
            || (data.get("name").is_some() && data.get("lastModified").is_some() && data.get("version").is_some());
        if has_metadata_shape {
            return ChunkType::Metadata;
        }

        ChunkType::Metadata
    }

    /// `chunk(data, fileKey, type?)` — the orchestrator's
    /// detect/dispatch/post-process pipeline.
    pub async fn chunk(&self, data: &Value, file_key: &str, chunk_type: Option<ChunkType>) -> Result<ChunkResult> {
        let started = Instant::now();

        let chunk_type = chunk_type.unwrap_or_else(|| Self::detect_type(data));

        let strategy = self
            .strategies
            .get(&chunk_type)
            .ok_or_else(|| ChunkError::no_strategy(chunk_type.as_str()))?;

        let ctx = ChunkingContext::root(file_key, self.config.max_chunk_size);

        if self.config.debug {
            tracing::debug!(file_key, %chunk_type, "dispatching chunk strategy");
        }

        let mut result = strategy.chunk(data, &ctx).await?;

        {
            let mut graph = self.graph.borrow_mut();
            for chunk in &result.chunks {
                graph.add_node(chunk.id.clone(), None);
                for link in &chunk.links {
                    graph.add_reference(chunk.id.clone(), link.clone());
                }
            }
        }

        if self.config.optimization_level != OptimizationLevel::None {
            let optimizer = ChunkOptimizer::new(self.config.max_chunk_size);
            result.chunks = result
                .chunks
                .into_iter()
                .map(|c| optimizer.optimize(&c, self.config.optimization_level))
                .collect();
        }

        if self.config.detect_circular_references {
            let cycles = self.graph.borrow().detect_cycles();
            if !cycles.is_empty() {
                tracing::warn!(count = cycles.len(), "reference graph cycle(s) detected");
                self.warnings.borrow_mut().push(Warning::CyclesDetected(cycles));
            }
        }

        if self.config.collect_metrics {
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let mut metrics = self.metrics.borrow_mut();
            metrics.record_time(chunk_type, elapsed_ms);
            for chunk in &result.chunks {
                metrics.record_chunk(chunk.chunk_type);
                let size = crate::size_estimator::estimate(&chunk.data) as u64;
                metrics.record_size(chunk.chunk_type, size);
            }
        }

        if self.config.debug {
            tracing::info!(
                file_key,
                chunks = result.chunks.len(),
                primary = %result.primary_chunk_id,
                "chunk() complete"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn detects_and_dispatches_node_type() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let data = json!({"id": "n1", "type": "FRAME", "name": "root"});
        let result = chunker.chunk(&data, "fk", None).await.unwrap();
        assert!(result.primary_chunk_id.contains(":node:"));
    }

    #[tokio::test]
    async fn detects_global_vars_type() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let data = json!({"variables": {"v1": {"type": "FLOAT", "value": 1}}});
        let result = chunker.chunk(&data, "fk", None).await.unwrap();
        assert!(result.primary_chunk_id.contains(":globalVars:"));
    }

    #[tokio::test]
    async fn detects_metadata_type_by_default() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let data = json!({"name": "f", "schemaVersion": 1});
        let result = chunker.chunk(&data, "fk", None).await.unwrap();
        assert!(result.primary_chunk_id.contains(":metadata:"));
    }

    #[tokio::test]
    async fn explicit_type_overrides_detection() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let data = json!({"name": "f", "schemaVersion": 1});
        let result = chunker.chunk(&data, "fk", Some(ChunkType::Metadata)).await.unwrap();
        assert!(result.primary_chunk_id.contains(":metadata:"));
    }

    #[tokio::test]
    async fn metrics_are_recorded_when_enabled() {
        let mut config = ChunkerConfig::default();
        config.collect_metrics = true;
        let chunker = Chunker::new(config);
        let data = json!({"id": "n1", "type": "FRAME", "name": "root"});
        chunker.chunk(&data, "fk", None).await.unwrap();

        let stats = chunker.metrics().statistics();
        assert_eq!(stats.total_count, 1);
    }

    #[tokio::test]
    async fn metrics_untouched_when_disabled() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let data = json!({"id": "n1", "type": "FRAME", "name": "root"});
        chunker.chunk(&data, "fk", None).await.unwrap();

        let stats = chunker.metrics().statistics();
        assert_eq!(stats.total_count, 0);
    }

    #[tokio::test]
    async fn invariant_2_chunks_respect_max_size_under_medium_or_higher() {
        let max = 2048;
        let mut config = ChunkerConfig::default();
        config.max_chunk_size = max;
        let chunker = Chunker::new(config);

        let children: Vec<Value> = (0..20)
            .map(|i| json!({"id": format!("c{i}"), "type": "RECTANGLE", "name": "r", "fills": [{"type": "SOLID", "pad": "x".repeat(500)}]}))
            .collect();
        let data = json!({"id": "root", "type": "FRAME", "name": "root", "children": children});

        let result = chunker.chunk(&data, "fk", None).await.unwrap();
        for chunk in &result.chunks {
            let size = crate::size_estimator::estimate(&chunk.data);
            assert!(size <= max, "chunk {} size {} exceeds {}", chunk.id, size, max);
        }
    }
}
