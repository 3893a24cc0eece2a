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

//! Chunk-level compression/splitting/merging at four optimization
//! levels. Every operation returns a new value; inputs are never
//! mutated.

use crate::chunk_id;
use crate::error::{ChunkError, Result};
use crate::model::{Chunk, ChunkType};
use crate::size_estimator::over;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Monotone control over how aggressively the optimizer discards
/// non-essential fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptimizationLevel {
    /// Deep copy only, no field removal.
    None,
    /// Drop a small deny-list of fields and null/undefined values.
    Low,
    /// Type-specific compression (see `ChunkOptimizer::compress`).
    Medium,
    /// `MEDIUM`, then strip every underscore-prefixed key at any depth.
    High,
}

impl Default for OptimizationLevel {
    fn default() -> Self {
        OptimizationLevel::Medium
    }
}

const LOW_DENY_LIST: &[&str] = &["thumbnailUrl", "documentationLinks", "editorType"];

/// Compresses/splits/merges chunks. Configured with the same
/// `maxChunkSize` as the orchestrator, since `split` needs a budget.
#[derive(Debug, Clone, Copy)]
pub struct ChunkOptimizer {
    max_size: usize,
}

impl ChunkOptimizer {
    /// A new optimizer bounded to `max_size` bytes per chunk.
    pub fn new(max_size: usize) -> Self {
        ChunkOptimizer { max_size }
    }

    /// Apply `level` to `chunk`, returning a new chunk.
    pub fn optimize(&self, chunk: &Chunk, level: OptimizationLevel) -> Chunk {
        let mut out = chunk.clone();
        out.data = match level {
            OptimizationLevel::None => chunk.data.clone(),
            OptimizationLevel::Low => strip_low(&chunk.data),
            OptimizationLevel::Medium => self.compress(chunk).data,
            OptimizationLevel::High => strip_underscored(&self.compress(chunk).data),
        };
        out
    }

    /// Type-specific compression.
    pub fn compress(&self, chunk: &Chunk) -> Chunk {
        let mut out = chunk.clone();
        out.data = match chunk.chunk_type {
            ChunkType::Node => compress_node(&chunk.data),
            ChunkType::Metadata => compress_metadata(&chunk.data),
            ChunkType::GlobalVars => compress_global_vars(&chunk.data),
        };
        out
    }

    /// Split `chunk` if it's a type with a known splitting rule and is
    /// over `max`; otherwise returns `[chunk]` unchanged. This is a
    /// size-driven repack of an already-produced chunk's raw data,
    /// distinct from the strategies' own structural splitting.
    pub fn split(&self, chunk: &Chunk, max: usize) -> Vec<Chunk> {
        if !over(&chunk.data, max) {
            return vec![chunk.clone()];
        }

        match chunk.chunk_type {
            ChunkType::GlobalVars => split_global_vars(chunk, max),
            _ => vec![chunk.clone()],
        }
    }

    /// Reverse of `split` for the same type-specific rules. Node
    /// children are re-attached from linked chunks in link order;
    /// metadata core/detail objects are shallow-merged (core wins on
    /// collision); global-vars variables are merged by id. Errors if
    /// `chunks` is empty.
    pub fn merge(&self, chunks: &[Chunk]) -> Result<Chunk> {
        let (first, rest) = chunks
            .split_first()
            .ok_or_else(|| ChunkError::invalid_input("merge requires at least one chunk"))?;

        if rest.is_empty() {
            return Ok(first.clone());
        }

        let merged_data = match first.chunk_type {
            ChunkType::Node => merge_node(first, rest),
            ChunkType::Metadata => merge_metadata(first, rest),
            ChunkType::GlobalVars => merge_global_vars(first, rest),
        };

        let mut out = first.clone();
        out.data = merged_data;
        Ok(out)
    }
}

fn strip_low(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if k.starts_with('_') || LOW_DENY_LIST.contains(&k.as_str()) {
                    continue;
                }
                if v.is_null() {
                    continue;
                }
                out.insert(k.clone(), strip_low(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().filter(|v| !v.is_null()).map(strip_low).collect()),
        other => other.clone(),
    }
}

fn strip_underscored(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if k.starts_with('_') {
                    continue;
                }
                out.insert(k.clone(), strip_underscored(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(strip_underscored).collect()),
        other => other.clone(),
    }
}

fn pick(value: &Value, keys: &[&str]) -> Value {
    let mut out = Map::new();
    for k in keys {
        if let Some(v) = value.get(*k) {
            out.insert(k.to_string(), v.clone());
        }
    }
    Value::Object(out)
}

fn compress_node(value: &Value) -> Value {
    let mut out = pick(
        value,
        &[
            "id",
            "type",
            "name",
            "x",
            "y",
            "width",
            "height",
            "fills",
            "strokes",
            "cornerRadius",
            "blendMode",
        ],
    );
    if value.get("children").is_some() {
        if let Some(obj) = out.as_object_mut() {
            obj.insert("children".to_string(), Value::Array(Vec::new()));
        }
    }
    out
}

fn compress_metadata(value: &Value) -> Value {
    let mut out = pick(value, &["name", "version", "schemaVersion", "lastModified"]);

    if let Some(components) = value.get("components").and_then(Value::as_object) {
        let reduced: Map<String, Value> = components
            .iter()
            .map(|(k, v)| (k.clone(), pick(v, &["name"])))
            .collect();
        if let Some(obj) = out.as_object_mut() {
            obj.insert("components".to_string(), Value::Object(reduced));
        }
    }
    if let Some(styles) = value.get("styles").and_then(Value::as_object) {
        let reduced: Map<String, Value> = styles.iter().map(|(k, v)| (k.clone(), pick(v, &["name"]))).collect();
        if let Some(obj) = out.as_object_mut() {
            obj.insert("styles".to_string(), Value::Object(reduced));
        }
    }

    out
}

fn compress_global_vars(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                let mut reduced = pick(v, &["name", "type"]);
                if let Some(values_by_mode) = v.get("valuesByMode") {
                    if let Some(obj) = reduced.as_object_mut() {
                        obj.insert("valuesByMode".to_string(), values_by_mode.clone());
                    }
                }
                out.insert(k.clone(), reduced);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn split_global_vars(chunk: &Chunk, max: usize) -> Vec<Chunk> {
    let entries: Vec<(String, Value)> = match &chunk.data {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => return vec![chunk.clone()],
    };

    let mut out = Vec::new();
    let mut current: Vec<(String, Value)> = Vec::new();
    let mut index = 0usize;

    for entry in entries {
        let mut candidate = current.clone();
        candidate.push(entry.clone());
        let candidate_value: Map<String, Value> = candidate.iter().cloned().collect();

        if over(&Value::Object(candidate_value), max) && !current.is_empty() {
            let sub: Map<String, Value> = current.iter().cloned().collect();
            let id = chunk_id::generate(&chunk.file_key, ChunkType::GlobalVars, Some(&format!("split-{index}")));
            let mut sub_chunk = Chunk::new(&id, &chunk.file_key, ChunkType::GlobalVars, Value::Object(sub));
            sub_chunk.links = chunk.links.clone();
            out.push(sub_chunk);
            index += 1;
            current = vec![entry];
        } else {
            current.push(entry);
        }
    }

    if !current.is_empty() {
        let sub: Map<String, Value> = current.into_iter().collect();
        let id = chunk_id::generate(&chunk.file_key, ChunkType::GlobalVars, Some(&format!("split-{index}")));
        let mut sub_chunk = Chunk::new(&id, &chunk.file_key, ChunkType::GlobalVars, Value::Object(sub));
        sub_chunk.links = chunk.links.clone();
        out.push(sub_chunk);
    }

    if out.is_empty() {
        vec![chunk.clone()]
    } else {
        out
    }
}

fn merge_node(first: &Chunk, rest: &[Chunk]) -> Value {
    let mut data = first.data.clone();
    let by_id: std::collections::HashMap<&str, &Chunk> = rest.iter().map(|c| (c.id.as_str(), c)).collect();

    if let Some(children) = data.get_mut("children").and_then(Value::as_array_mut) {
        for link in &first.links {
            if let Some(linked) = by_id.get(link.as_str()) {
                for child_slot in children.iter_mut() {
                    let matches = child_slot.get("chunkId").and_then(Value::as_str) == Some(link.as_str());
                    if matches {
                        *child_slot = linked.data.clone();
                    }
                }
            }
        }
    }

    data
}

fn merge_metadata(first: &Chunk, rest: &[Chunk]) -> Value {
    let mut merged = match &first.data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    for details in rest {
        if let Value::Object(map) = &details.data {
            for (k, v) in map {
                merged.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
    }

    Value::Object(merged)
}

fn merge_global_vars(first: &Chunk, rest: &[Chunk]) -> Value {
    let mut merged = match &first.data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    for part in rest {
        if let Value::Object(map) = &part.data {
            for (k, v) in map {
                merged.insert(k.clone(), v.clone());
            }
        }
    }

    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_chunk() -> Chunk {
        Chunk::new(
            "fk:node:n1",
            "fk",
            ChunkType::Node,
            json!({
                "id": "n1", "type": "FRAME", "name": "root", "x": 0, "y": 0,
                "width": 100, "height": 100, "children": [{"id": "c1"}],
                "_internal": "drop-me", "unrelatedField": "also not kept",
            }),
        )
    }

    #[test]
    fn low_drops_deny_list_and_nulls() {
        let optimizer = ChunkOptimizer::new(1024);
        let chunk = Chunk::new(
            "fk:metadata:core",
            "fk",
            ChunkType::Metadata,
            json!({"name": "f", "thumbnailUrl": "x", "documentationLinks": null, "version": "1"}),
        );
        let out = optimizer.optimize(&chunk, OptimizationLevel::Low);
        assert!(out.data.get("thumbnailUrl").is_none());
        assert!(out.data.get("documentationLinks").is_none());
        assert_eq!(out.data["name"], json!("f"));
    }

    #[test]
    fn medium_compresses_node_to_known_fields() {
        let optimizer = ChunkOptimizer::new(1024);
        let out = optimizer.optimize(&node_chunk(), OptimizationLevel::Medium);
        assert!(out.data.get("unrelatedField").is_none());
        assert_eq!(out.data["id"], json!("n1"));
        assert_eq!(out.data["children"], json!([]));
    }

    #[test]
    fn high_additionally_strips_underscored_keys() {
        let optimizer = ChunkOptimizer::new(1024);
        let medium = optimizer.optimize(&node_chunk(), OptimizationLevel::Medium);
        assert!(medium.data.get("_internal").is_none(), "compress already drops unknown keys");

        let mut with_underscore = node_chunk();
        with_underscore.data["fills"] = json!({"_private": 1, "color": "red"});
        let out = optimizer.optimize(&with_underscore, OptimizationLevel::High);
        assert!(out.data["fills"].get("_private").is_none());
    }

    #[test]
    fn merge_empty_is_error() {
        let optimizer = ChunkOptimizer::new(1024);
        let err = optimizer.merge(&[]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn merge_single_chunk_is_identity() {
        let optimizer = ChunkOptimizer::new(1024);
        let chunk = node_chunk();
        let merged = optimizer.merge(std::slice::from_ref(&chunk)).unwrap();
        assert_eq!(merged.id, chunk.id);
    }

    #[test]
    fn split_global_vars_respects_budget() {
        let mut map = Map::new();
        for i in 0..50 {
            map.insert(format!("v{i}"), json!({"type": "COLOR", "r": 1, "g": 1, "b": 1, "pad": "x".repeat(100)}));
        }
        let chunk = Chunk::new("fk:globalVars:COLOR", "fk", ChunkType::GlobalVars, Value::Object(map));
        let optimizer = ChunkOptimizer::new(512);
        let parts = optimizer.split(&chunk, 512);
        assert!(parts.len() > 1);
        for p in &parts {
            assert!(!over(&p.data, 512) || p.data.as_object().map(|m| m.len()).unwrap_or(0) <= 1);
        }
    }
}
