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

//! Domain-specific assertions for chunker/storage tests: size-budget
//! compliance, id format, and reference-graph integrity.

use figchunk_core::{chunk_id, size_estimator, ChunkResult};
use std::collections::HashSet;

/// Assert every chunk in `result` serializes under `max_size`, except a
/// single indivisible leaf.
pub fn assert_chunks_under_budget(result: &ChunkResult, max_size: usize) {
    for chunk in &result.chunks {
        let size = size_estimator::estimate(&chunk.data);
        assert!(
            size <= max_size || chunk.data.get("children").map(|c| c.as_array().map(|a| a.is_empty()).unwrap_or(true)).unwrap_or(true),
            "chunk {} is {size} bytes, over budget {max_size}",
            chunk.id
        );
    }
}

/// Assert `id` round-trips through `chunk_id::parse` and names the
/// expected file key and type.
pub fn assert_chunk_id_valid(id: &str, expected_file_key: &str, expected_type: figchunk_core::ChunkType) {
    let parsed = chunk_id::parse(id).unwrap_or_else(|| panic!("chunk id {id} should be parsable"));
    assert_eq!(parsed.file_key, expected_file_key);
    assert_eq!(parsed.chunk_type, expected_type);
    assert!(!parsed.identifier.is_empty());
}

/// Assert `result.references` equals the transitive closure of the
/// primary chunk's links restricted to ids present in `result.chunks`,
/// minus the primary itself.
pub fn assert_references_match_closure(result: &ChunkResult) {
    let present: HashSet<&str> = result.chunks.iter().map(|c| c.id.as_str()).collect();
    let mut closure: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = result.primary().links.clone();

    while let Some(id) = stack.pop() {
        if !present.contains(id.as_str()) || id == result.primary_chunk_id {
            continue;
        }
        if closure.insert(id.clone()) {
            if let Some(chunk) = result.chunks.iter().find(|c| c.id == id) {
                stack.extend(chunk.links.clone());
            }
        }
    }

    let actual: HashSet<&String> = result.references.iter().collect();
    let expected: HashSet<&String> = closure.iter().collect();
    assert_eq!(actual, expected, "references should equal the reachable-from-primary closure");
}

/// Assert every link on every chunk in `result` names a chunk that is
/// actually present in `result.chunks` — no dangling references.
pub fn assert_no_dangling_links(result: &ChunkResult) {
    let present: HashSet<&str> = result.chunks.iter().map(|c| c.id.as_str()).collect();
    for chunk in &result.chunks {
        for link in &chunk.links {
            assert!(present.contains(link.as_str()), "chunk {} links to missing chunk {link}", chunk.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figchunk_core::{Chunk, ChunkType};
    use serde_json::json;

    fn result_with(primary: Chunk, rest: Vec<Chunk>, references: Vec<String>) -> ChunkResult {
        let primary_id = primary.id.clone();
        let mut chunks = vec![primary];
        chunks.extend(rest);
        ChunkResult {
            chunks,
            primary_chunk_id: primary_id,
            references,
        }
    }

    #[test]
    fn no_dangling_links_passes_for_consistent_graph() {
        let child = Chunk::new("f:node:child", "f", ChunkType::Node, json!({}));
        let mut primary = Chunk::new("f:node:root", "f", ChunkType::Node, json!({}));
        primary.links.push(child.id.clone());
        let result = result_with(primary, vec![child], vec!["f:node:child".to_string()]);

        assert_no_dangling_links(&result);
        assert_references_match_closure(&result);
    }

    #[test]
    #[should_panic(expected = "links to missing chunk")]
    fn no_dangling_links_catches_missing_target() {
        let mut primary = Chunk::new("f:node:root", "f", ChunkType::Node, json!({}));
        primary.links.push("f:node:missing".to_string());
        let result = result_with(primary, vec![], vec![]);

        assert_no_dangling_links(&result);
    }

    #[test]
    fn chunk_id_valid_round_trips() {
        assert_chunk_id_valid("file1:node:abc123", "file1", ChunkType::Node);
    }
}
