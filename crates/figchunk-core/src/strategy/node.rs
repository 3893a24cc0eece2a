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

//! Node tree splitting.

use super::ChunkStrategy;
use crate::chunk_id;
use crate::context::ChunkingContext;
use crate::error::{ChunkError, Result};
use crate::model::{Chunk, ChunkResult, ChunkType};
use crate::size_estimator::should_split_node;
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexSet;
use serde_json::{json, Value};

/// Splits a node (sub)tree, extracting over-budget children into their
/// own chunks and replacing them in place with reference objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeStrategy;

impl NodeStrategy {
    /// A new `NodeStrategy`. Stateless — all per-call state lives in
    /// the `ChunkingContext`.
    pub fn new() -> Self {
        NodeStrategy
    }

    fn leaf_identifier(data: &Value) -> String {
        data.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("node-{}", Utc::now().timestamp_millis()))
    }

    fn reference_object(child: &Value, chunk_id: &str) -> Value {
        json!({
            "id": child.get("id").cloned().unwrap_or(Value::Null),
            "name": child.get("name").cloned().unwrap_or(Value::Null),
            "type": child.get("type").cloned().unwrap_or(Value::Null),
            "chunkId": chunk_id,
        })
    }

    /// Degenerate linear-packer mode: depth-first flat splitting with
    /// no reference-object substitution
    /// and no recursive per-child chunks — every node over budget is
    /// simply packed into successive chunks in traversal order, each
    /// kept under `ctx.max_size`. Reuses `should_split_node`/`estimate`
    /// rather than re-implementing the size check.
    pub fn pack_linear(&self, data: &Value, ctx: &ChunkingContext) -> Result<ChunkResult> {
        if ctx.depth_exceeded() {
            return Err(ChunkError::depth_exceeded(ctx.depth, crate::context::MAX_DEPTH));
        }

        let mut flat = Vec::new();
        flatten_depth_first(data, &mut flat);

        let mut chunks = Vec::new();
        let mut current: Vec<Value> = Vec::new();
        let mut current_size = 2usize;
        let mut index = 0usize;

        let mut flush = |current: &mut Vec<Value>, current_size: &mut usize, index: &mut usize, chunks: &mut Vec<Chunk>| {
            if current.is_empty() {
                return;
            }
            let id = chunk_id::generate(&ctx.file_key, ChunkType::Node, Some(&format!("pack-{index}")));
            let chunk = Chunk::new(&id, &ctx.file_key, ChunkType::Node, json!({ "items": current.clone() }));
            chunks.push(chunk);
            *index += 1;
            current.clear();
            *current_size = 2;
        };

        for item in flat.drain(..) {
            let item_size = crate::size_estimator::estimate(&item) + 1;
            if current_size + item_size > ctx.max_size && !current.is_empty() {
                flush(&mut current, &mut current_size, &mut index, &mut chunks);
            }
            current_size += item_size;
            current.push(item);
        }
        flush(&mut current, &mut current_size, &mut index, &mut chunks);

        if chunks.is_empty() {
            let id = chunk_id::generate(&ctx.file_key, ChunkType::Node, Some("pack-0"));
            chunks.push(Chunk::new(&id, &ctx.file_key, ChunkType::Node, json!({ "items": [] })));
        }

        let primary_chunk_id = chunks[0].id.clone();
        let references: Vec<String> = chunks[1..].iter().map(|c| c.id.clone()).collect();
        for id in &references {
            chunks[0].links.push(id.clone());
        }

        Ok(ChunkResult {
            chunks,
            primary_chunk_id,
            references,
        })
    }
}

fn flatten_depth_first(node: &Value, out: &mut Vec<Value>) {
    let mut shallow = node.clone();
    if let Some(obj) = shallow.as_object_mut() {
        obj.remove("children");
    }
    out.push(shallow);
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            flatten_depth_first(child, out);
        }
    }
}

#[async_trait(?Send)]
impl ChunkStrategy for NodeStrategy {
    fn should_chunk(&self, data: &Value, ctx: &ChunkingContext) -> bool {
        should_split_node(data, ctx.max_size)
    }

    fn chunk_type(&self) -> ChunkType {
        ChunkType::Node
    }

    async fn chunk(&self, data: &Value, ctx: &ChunkingContext) -> Result<ChunkResult> {
        if ctx.depth_exceeded() {
            return Err(ChunkError::depth_exceeded(ctx.depth, crate::context::MAX_DEPTH));
        }

        let source_id = data.get("id").and_then(Value::as_str).map(str::to_string);

        if !self.should_chunk(data, ctx) {
            let identifier = Self::leaf_identifier(data);
            let chunk_id = chunk_id::generate(&ctx.file_key, ChunkType::Node, Some(&identifier));
            if let Some(ref sid) = source_id {
                ctx.register_id(sid.clone(), chunk_id.clone());
            }
            let chunk = Chunk::new(&chunk_id, &ctx.file_key, ChunkType::Node, data.clone());
            return Ok(ChunkResult {
                chunks: vec![chunk],
                primary_chunk_id: chunk_id,
                references: Vec::new(),
            });
        }

        // Step 1: assign the primary chunk id up front.
        let primary_identifier = Self::leaf_identifier(data);
        let primary_id = chunk_id::generate(&ctx.file_key, ChunkType::Node, Some(&primary_identifier));
        if let Some(ref sid) = source_id {
            ctx.register_id(sid.clone(), primary_id.clone());
        }

        let empty_children: Vec<Value> = Vec::new();
        let children = data
            .get("children")
            .and_then(Value::as_array)
            .unwrap_or(&empty_children);

        let mut rewritten_children: Vec<Value> = Vec::with_capacity(children.len());
        let mut dependent_chunks: Vec<Chunk> = Vec::new();
        let mut direct_child_ids: Vec<String> = Vec::new();
        let mut transitive_refs: IndexSet<String> = IndexSet::new();

        for (index, child) in children.iter().enumerate() {
            if !should_split_node(child, ctx.max_size) {
                rewritten_children.push(child.clone());
                continue;
            }

            let child_source_id = child.get("id").and_then(Value::as_str).map(str::to_string);

            let child_chunk_id = match child_source_id.as_deref().and_then(|sid| ctx.lookup_id(sid)) {
                Some(existing) => existing,
                None => {
                    let identifier = child_source_id
                        .clone()
                        .unwrap_or_else(|| format!("node-{}-{index}", Utc::now().timestamp_millis()));
                    let generated = chunk_id::generate(&ctx.file_key, ChunkType::Node, Some(&identifier));
                    if let Some(ref sid) = child_source_id {
                        ctx.register_id(sid.clone(), generated.clone());
                    }
                    generated
                }
            };

            rewritten_children.push(Self::reference_object(child, &child_chunk_id));
            direct_child_ids.push(child_chunk_id.clone());

            let path_segment = child_source_id.clone().unwrap_or_else(|| index.to_string());
            let child_ctx = ctx.child(primary_id.clone(), path_segment);
            let child_result = self.chunk(child, &child_ctx).await?;

            for c in child_result.chunks {
                dependent_chunks.push(c);
            }
            for r in &child_result.references {
                transitive_refs.insert(r.clone());
            }
            transitive_refs.insert(child_chunk_id);
        }

        let mut primary_data = data.clone();
        if let Some(obj) = primary_data.as_object_mut() {
            obj.insert("children".to_string(), Value::Array(rewritten_children));
        }

        let mut links: Vec<String> = direct_child_ids.clone();
        for r in &transitive_refs {
            if !links.contains(r) {
                links.push(r.clone());
            }
        }

        let mut primary_chunk = Chunk::new(&primary_id, &ctx.file_key, ChunkType::Node, primary_data);
        primary_chunk.links = links.clone();

        let mut chunks = vec![primary_chunk];
        chunks.extend(dependent_chunks);

        Ok(ChunkResult {
            chunks,
            primary_chunk_id: primary_id,
            references: links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(id: &str) -> Value {
        json!({
            "id": id,
            "type": "RECTANGLE",
            "name": id,
            "width": 10,
            "height": 10,
            "fills": [{"type": "SOLID", "payload": "x".repeat(2000)}],
        })
    }

    #[tokio::test]
    async fn s2_node_split_twelve_children() {
        let children: Vec<Value> = (0..12).map(|i| rect(&format!("c{i}"))).collect();
        let root = json!({"id": "root", "type": "FRAME", "name": "root", "children": children});

        let strategy = NodeStrategy::new();
        let ctx = ChunkingContext::root("file1", 4096);
        let result = strategy.chunk(&root, &ctx).await.unwrap();

        let primary = result.primary();
        let rewritten = primary.data.get("children").unwrap().as_array().unwrap();
        assert_eq!(rewritten.len(), 12);
        for entry in rewritten {
            assert!(entry.get("chunkId").is_some());
        }
        assert_eq!(primary.links.len(), 12);
        assert_eq!(result.references.len(), 12);
        assert_eq!(result.chunks.len(), 13);
    }

    #[tokio::test]
    async fn leaf_node_is_single_chunk() {
        let leaf = rect("leaf1");
        let strategy = NodeStrategy::new();
        let ctx = ChunkingContext::root("file1", 1_000_000);
        let result = strategy.chunk(&leaf, &ctx).await.unwrap();
        assert_eq!(result.chunks.len(), 1);
        assert!(result.references.is_empty());
    }

    #[tokio::test]
    async fn depth_cap_triggers_error() {
        let strategy = NodeStrategy::new();
        let mut ctx = ChunkingContext::root("file1", 4096);
        for i in 0..101 {
            ctx = ctx.child("p", i.to_string());
        }
        let leaf = rect("leaf");
        let err = strategy.chunk(&leaf, &ctx).await.unwrap_err();
        assert!(err.is_depth_exceeded());
    }

    #[tokio::test]
    async fn pack_linear_keeps_every_chunk_under_budget() {
        let children: Vec<Value> = (0..20).map(|i| rect(&format!("c{i}"))).collect();
        let root = json!({"id": "root", "type": "FRAME", "name": "root", "children": children});
        let strategy = NodeStrategy::new();
        let ctx = ChunkingContext::root("file1", 4096);
        let result = strategy.pack_linear(&root, &ctx).unwrap();
        assert!(result.chunks.len() > 1);
        for chunk in &result.chunks {
            assert!(crate::size_estimator::estimate(&chunk.data) <= ctx.max_size);
        }
    }
}
