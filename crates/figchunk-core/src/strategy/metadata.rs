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

//! Document-metadata-envelope splitting.

use super::ChunkStrategy;
use crate::chunk_id;
use crate::context::ChunkingContext;
use crate::error::Result;
use crate::model::{Chunk, ChunkResult, ChunkType};
use crate::size_estimator::over;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

/// Splits the document metadata envelope into `core`/`details`/
/// `structure` chunks when it doesn't fit under budget as one chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataStrategy;

impl MetadataStrategy {
    /// A new `MetadataStrategy`.
    pub fn new() -> Self {
        MetadataStrategy
    }

    fn field(data: &Value, key: &str) -> Value {
        data.get(key).cloned().unwrap_or(Value::Null)
    }

    fn page_summary(document: &Value) -> Vec<Value> {
        document
            .get("children")
            .and_then(Value::as_array)
            .map(|pages| {
                pages
                    .iter()
                    .map(|p| {
                        json!({
                            "id": Self::field(p, "id"),
                            "name": Self::field(p, "name"),
                            "type": Self::field(p, "type"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn abbreviate(node: &Value, depth: usize) -> Value {
        let mut out = Map::new();
        out.insert("id".to_string(), Self::field(node, "id"));
        out.insert("name".to_string(), Self::field(node, "name"));
        out.insert("type".to_string(), Self::field(node, "type"));

        if let Some(children) = node.get("children").and_then(Value::as_array) {
            let kept: Vec<Value> = children.iter().take(10).map(|c| Self::abbreviate(c, depth + 1)).collect();
            if children.len() > 10 {
                out.insert("childrenCount".to_string(), json!(children.len()));
            }
            out.insert("children".to_string(), Value::Array(kept));
        }

        Value::Object(out)
    }
}

#[async_trait(?Send)]
impl ChunkStrategy for MetadataStrategy {
    fn should_chunk(&self, data: &Value, ctx: &ChunkingContext) -> bool {
        over(data, ctx.max_size)
    }

    fn chunk_type(&self) -> ChunkType {
        ChunkType::Metadata
    }

    async fn chunk(&self, data: &Value, ctx: &ChunkingContext) -> Result<ChunkResult> {
        if !self.should_chunk(data, ctx) {
            let id = chunk_id::generate(&ctx.file_key, ChunkType::Metadata, Some("full"));
            ctx.register_id("full", id.clone());
            let chunk = Chunk::new(&id, &ctx.file_key, ChunkType::Metadata, data.clone());
            return Ok(ChunkResult {
                chunks: vec![chunk],
                primary_chunk_id: id,
                references: Vec::new(),
            });
        }

        let document = data.get("document").cloned().unwrap_or(Value::Null);
        let component_count = data.get("components").and_then(Value::as_object).map(|m| m.len());
        let style_count = data.get("styles").and_then(Value::as_object).map(|m| m.len());

        let core_id = chunk_id::generate(&ctx.file_key, ChunkType::Metadata, Some("core"));
        let details_id = chunk_id::generate(&ctx.file_key, ChunkType::Metadata, Some("details"));
        let structure_id = chunk_id::generate(&ctx.file_key, ChunkType::Metadata, Some("structure"));
        ctx.register_id("core", core_id.clone());
        ctx.register_id("details", details_id.clone());
        ctx.register_id("structure", structure_id.clone());

        let mut core_data = json!({
            "name": Self::field(data, "name"),
            "lastModified": Self::field(data, "lastModified"),
            "version": Self::field(data, "version"),
            "thumbnailUrl": Self::field(data, "thumbnailUrl"),
            "schemaVersion": Self::field(data, "schemaVersion"),
            "documentationLinks": Self::field(data, "documentationLinks"),
            "pages": Self::page_summary(&document),
        });
        if let Some(n) = component_count {
            core_data["componentCount"] = json!(n);
        }
        if let Some(n) = style_count {
            core_data["styleCount"] = json!(n);
        }

        let details_data = json!({
            "editorType": Self::field(data, "editorType"),
            "linkAccess": Self::field(data, "linkAccess"),
            "createdAt": Self::field(data, "createdAt"),
            "branches": Self::field(data, "branches"),
            "components": Self::field(data, "components"),
            "styles": Self::field(data, "styles"),
            "users": Self::field(data, "users"),
            "lastUser": Self::field(data, "lastUser"),
        });

        let structure_data = Self::abbreviate(&document, 0);

        let links = vec![details_id.clone(), structure_id.clone()];

        let mut core_chunk = Chunk::new(&core_id, &ctx.file_key, ChunkType::Metadata, core_data);
        core_chunk.links = links.clone();

        let details_chunk = Chunk::new(&details_id, &ctx.file_key, ChunkType::Metadata, details_data);
        let structure_chunk = Chunk::new(&structure_id, &ctx.file_key, ChunkType::Metadata, structure_data);

        Ok(ChunkResult {
            chunks: vec![core_chunk, details_chunk, structure_chunk],
            primary_chunk_id: core_id,
            references: links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc(component_entries: usize) -> Value {
        let mut components = Map::new();
        for i in 0..component_entries {
            components.insert(format!("comp{i}"), json!({"name": format!("Component {i}")}));
        }
        json!({
            "name": "f",
            "version": "1",
            "schemaVersion": 14,
            "lastModified": "t",
            "components": Value::Object(components),
            "styles": {"style1": {"name": "Style"}},
            "document": {
                "id": "0:0",
                "name": "Document",
                "type": "DOCUMENT",
                "children": [
                    {"id": "p1", "name": "Page 1", "type": "CANVAS"},
                    {"id": "p2", "name": "Page 2", "type": "CANVAS"},
                ],
            },
        })
    }

    #[tokio::test]
    async fn s3_metadata_split_produces_three_chunks() {
        let doc = sample_doc(100);
        let strategy = MetadataStrategy::new();
        let ctx = ChunkingContext::root("f", 500);
        let result = strategy.chunk(&doc, &ctx).await.unwrap();

        assert_eq!(result.chunks.len(), 3);
        let core = result.primary();
        assert_eq!(core.data["componentCount"], json!(100));
        assert_eq!(core.data["styleCount"], json!(1));
        assert_eq!(core.data["pages"].as_array().unwrap().len(), 2);
        assert_eq!(result.references.len(), 2);

        let details_id = &result.references[0];
        let structure_id = &result.references[1];
        assert_eq!(core.links, vec![details_id.clone(), structure_id.clone()]);

        let details = result.chunks.iter().find(|c| &c.id == details_id).unwrap();
        assert_eq!(details.data["components"].as_object().unwrap().len(), 100);
    }

    #[tokio::test]
    async fn under_budget_yields_single_chunk() {
        let doc = json!({"name": "f", "schemaVersion": 1});
        let strategy = MetadataStrategy::new();
        let ctx = ChunkingContext::root("f", 1_000_000);
        let result = strategy.chunk(&doc, &ctx).await.unwrap();
        assert_eq!(result.chunks.len(), 1);
        assert!(result.references.is_empty());
    }

    #[test]
    fn abbreviate_truncates_past_ten_children() {
        let children: Vec<Value> = (0..15).map(|i| json!({"id": i, "name": i, "type": "FRAME"})).collect();
        let doc = json!({"id": "root", "name": "root", "type": "DOCUMENT", "children": children});
        let abbreviated = MetadataStrategy::abbreviate(&doc, 0);
        assert_eq!(abbreviated["children"].as_array().unwrap().len(), 10);
        assert_eq!(abbreviated["childrenCount"], json!(15));
    }
}
