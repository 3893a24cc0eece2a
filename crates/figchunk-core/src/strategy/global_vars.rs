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

//! Global design-variable dictionary splitting.
//!
//! Variables are partitioned by a `VariableTag`, each non-empty,
//! in-budget group becomes one chunk, over-budget groups are split
//! greedily, and an index chunk ties the tags to their first chunk.

use super::ChunkStrategy;
use crate::chunk_id;
use crate::context::ChunkingContext;
use crate::error::Result;
use crate::model::{Chunk, ChunkResult, ChunkType};
use crate::size_estimator::over;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// The variable-type classifier used to partition the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableTag {
    /// Color value.
    Color,
    /// Floating-point scalar.
    Float,
    /// String value.
    StringTag,
    /// Boolean value.
    Boolean,
    /// Named text style.
    TextStyle,
    /// Named effect style.
    EffectStyle,
    /// Doesn't match any known tag.
    Other,
}

impl VariableTag {
    fn as_str(self) -> &'static str {
        match self {
            VariableTag::Color => "COLOR",
            VariableTag::Float => "FLOAT",
            VariableTag::StringTag => "STRING",
            VariableTag::Boolean => "BOOLEAN",
            VariableTag::TextStyle => "TEXT_STYLE",
            VariableTag::EffectStyle => "EFFECT_STYLE",
            VariableTag::Other => "OTHER",
        }
    }

    fn from_known_str(s: &str) -> Option<Self> {
        match s {
            "COLOR" => Some(VariableTag::Color),
            "FLOAT" => Some(VariableTag::Float),
            "STRING" => Some(VariableTag::StringTag),
            "BOOLEAN" => Some(VariableTag::Boolean),
            "TEXT_STYLE" => Some(VariableTag::TextStyle),
            "EFFECT_STYLE" => Some(VariableTag::EffectStyle),
            "OTHER" => Some(VariableTag::Other),
            _ => None,
        }
    }

    /// Classify a variable value. Uses `value.type` (uppercased) when it
    /// names a known variant; otherwise infers via a fixed tie-break
    /// order: `{r,g,b}`/`{r,g,b,a}` numeric fields → COLOR;
    /// `fontFamily`/`fontSize` → TEXT_STYLE; an `effects` array →
    /// EFFECT_STYLE; else OTHER.
    fn classify(value: &Value) -> Self {
        if let Some(type_str) = value.get("type").and_then(Value::as_str) {
            if let Some(tag) = VariableTag::from_known_str(&type_str.to_uppercase()) {
                return tag;
            }
        }

        let has_rgb = matches!(value.get("r"), Some(Value::Number(_)))
            && matches!(value.get("g"), Some(Value::Number(_)))
            && matches!(value.get("b"), Some(Value::Number(_)));
        if has_rgb {
            return VariableTag::Color;
        }

        if value.get("fontFamily").is_some() || value.get("fontSize").is_some() {
            return VariableTag::TextStyle;
        }

        if matches!(value.get("effects"), Some(Value::Array(_))) {
            return VariableTag::EffectStyle;
        }

        VariableTag::Other
    }
}

/// Splits the global-variable dictionary.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalVarsStrategy;

impl GlobalVarsStrategy {
    /// A new `GlobalVarsStrategy`.
    pub fn new() -> Self {
        GlobalVarsStrategy
    }

    fn entries(data: &Value) -> Vec<(String, Value)> {
        match data {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let id = v
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| i.to_string());
                    (id, v.clone())
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn group_object(entries: &[(String, Value)]) -> Value {
        let mut map = Map::new();
        for (id, value) in entries {
            map.insert(id.clone(), value.clone());
        }
        Value::Object(map)
    }
}

#[async_trait(?Send)]
impl ChunkStrategy for GlobalVarsStrategy {
    fn should_chunk(&self, data: &Value, ctx: &ChunkingContext) -> bool {
        over(data, ctx.max_size)
    }

    fn chunk_type(&self) -> ChunkType {
        ChunkType::GlobalVars
    }

    async fn chunk(&self, data: &Value, ctx: &ChunkingContext) -> Result<ChunkResult> {
        if !self.should_chunk(data, ctx) {
            let id = chunk_id::generate(&ctx.file_key, ChunkType::GlobalVars, Some("all"));
            ctx.register_id("all", id.clone());
            let chunk = Chunk::new(&id, &ctx.file_key, ChunkType::GlobalVars, data.clone());
            return Ok(ChunkResult {
                chunks: vec![chunk],
                primary_chunk_id: id,
                references: Vec::new(),
            });
        }

        let entries = Self::entries(data);

        let mut groups: IndexMap<VariableTag, Vec<(String, Value)>> = IndexMap::new();
        for (id, value) in entries {
            groups.entry(VariableTag::classify(&value)).or_default().push((id, value));
        }

        let mut produced: Vec<Chunk> = Vec::new();
        let mut index_entries: IndexMap<&'static str, String> = IndexMap::new();

        for (tag, members) in &groups {
            if members.is_empty() {
                continue;
            }

            let whole = Self::group_object(members);
            if !over(&whole, ctx.max_size) {
                let chunk_id_str = chunk_id::generate(&ctx.file_key, ChunkType::GlobalVars, Some(tag.as_str()));
                index_entries.entry(tag.as_str()).or_insert_with(|| chunk_id_str.clone());
                produced.push(Chunk::new(&chunk_id_str, &ctx.file_key, ChunkType::GlobalVars, whole));
                continue;
            }

            // Over budget: split greedily into sub-groups by accumulating
            // entries until the next one would exceed the budget.
            let mut sub_index = 0usize;
            let mut current: Vec<(String, Value)> = Vec::new();

            for member in members {
                let mut candidate = current.clone();
                candidate.push(member.clone());
                let candidate_value = Self::group_object(&candidate);

                if over(&candidate_value, ctx.max_size) && !current.is_empty() {
                    let sub_value = Self::group_object(&current);
                    let identifier = format!("{}-{}", tag.as_str(), sub_index);
                    let chunk_id_str = chunk_id::generate(&ctx.file_key, ChunkType::GlobalVars, Some(&identifier));
                    index_entries.entry(tag.as_str()).or_insert_with(|| chunk_id_str.clone());
                    produced.push(Chunk::new(&chunk_id_str, &ctx.file_key, ChunkType::GlobalVars, sub_value));
                    sub_index += 1;
                    current = vec![member.clone()];
                } else {
                    current = candidate;
                }
            }

            if !current.is_empty() {
                let sub_value = Self::group_object(&current);
                let identifier = format!("{}-{}", tag.as_str(), sub_index);
                let chunk_id_str = chunk_id::generate(&ctx.file_key, ChunkType::GlobalVars, Some(&identifier));
                index_entries.entry(tag.as_str()).or_insert_with(|| chunk_id_str.clone());
                produced.push(Chunk::new(&chunk_id_str, &ctx.file_key, ChunkType::GlobalVars, sub_value));
            }
        }

        let index_data: Map<String, Value> = index_entries
            .iter()
            .map(|(tag, id)| (tag.to_string(), json!(id)))
            .collect();

        let index_id = chunk_id::generate(&ctx.file_key, ChunkType::GlobalVars, Some("index"));
        let links: Vec<String> = produced.iter().map(|c| c.id.clone()).collect();

        let mut index_chunk = Chunk::new(&index_id, &ctx.file_key, ChunkType::GlobalVars, Value::Object(index_data));
        index_chunk.links = links.clone();

        let mut chunks = vec![index_chunk];
        chunks.extend(produced);

        Ok(ChunkResult {
            chunks,
            primary_chunk_id: index_id,
            references: links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_estimator::estimate;

    fn color_entry(i: usize) -> Value {
        json!({"id": format!("c{i}"), "type": "COLOR", "r": 0.1, "g": 0.2, "b": 0.3, "padding": "x".repeat(150)})
    }

    fn float_entry(i: usize) -> Value {
        json!({"id": format!("f{i}"), "type": "FLOAT", "value": i})
    }

    #[tokio::test]
    async fn s4_global_vars_partitioning() {
        let mut map = Map::new();
        for i in 0..100 {
            map.insert(format!("c{i}"), color_entry(i));
        }
        for i in 0..10 {
            map.insert(format!("f{i}"), float_entry(i));
        }
        let data = Value::Object(map);

        let strategy = GlobalVarsStrategy::new();
        let ctx = ChunkingContext::root("f", 2048);
        let result = strategy.chunk(&data, &ctx).await.unwrap();

        let index = result.primary();
        assert!(index.data.get("COLOR").is_some());
        assert!(index.data.get("FLOAT").is_some());

        let color_chunks: Vec<_> = result
            .chunks
            .iter()
            .filter(|c| c.id.contains(":globalVars:COLOR"))
            .collect();
        assert!(color_chunks.len() > 1, "COLOR group should split into sub-chunks");
        for c in &color_chunks {
            assert!(estimate(&c.data) <= 2048);
        }

        let float_chunks: Vec<_> = result
            .chunks
            .iter()
            .filter(|c| c.id.contains(":globalVars:FLOAT"))
            .collect();
        assert_eq!(float_chunks.len(), 1, "FLOAT group should fit in one chunk");
    }

    #[test]
    fn classify_infers_color_from_rgb_fields() {
        let v = json!({"r": 1.0, "g": 1.0, "b": 1.0});
        assert_eq!(VariableTag::classify(&v), VariableTag::Color);
    }

    #[test]
    fn classify_infers_text_style_from_font_fields() {
        let v = json!({"fontFamily": "Inter"});
        assert_eq!(VariableTag::classify(&v), VariableTag::TextStyle);
        let v = json!({"fontSize": 14});
        assert_eq!(VariableTag::classify(&v), VariableTag::TextStyle);
    }

    #[test]
    fn classify_infers_effect_style_from_effects_array() {
        let v = json!({"effects": [{"type": "DROP_SHADOW"}]});
        assert_eq!(VariableTag::classify(&v), VariableTag::EffectStyle);
    }

    #[test]
    fn classify_defaults_to_other() {
        let v = json!({"foo": "bar"});
        assert_eq!(VariableTag::classify(&v), VariableTag::Other);
    }

    #[test]
    fn classify_prefers_explicit_type_field() {
        let v = json!({"type": "boolean", "value": true});
        assert_eq!(VariableTag::classify(&v), VariableTag::Boolean);
    }

    #[tokio::test]
    async fn under_budget_yields_single_chunk() {
        let data = json!({"v1": {"type": "FLOAT", "value": 1}});
        let strategy = GlobalVarsStrategy::new();
        let ctx = ChunkingContext::root("f", 1_000_000);
        let result = strategy.chunk(&data, &ctx).await.unwrap();
        assert_eq!(result.chunks.len(), 1);
    }
}
