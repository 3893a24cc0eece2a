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

//! Per-operation state threaded through a strategy invocation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The depth cap past which the node strategy fails with `DepthExceeded`.
pub const MAX_DEPTH: usize = 100;

/// `idMap: sourceId -> chunkId`, shared by reference across a context and
/// every context derived from it via `child()`, so sibling strategy
/// invocations observe each other's id assignments.
pub type SharedIdMap = Rc<RefCell<HashMap<String, String>>>;

/// Propagated per-operation state.
#[derive(Debug, Clone)]
pub struct ChunkingContext {
    /// Source document key.
    pub file_key: String,
    /// Configured byte budget.
    pub max_size: usize,
    /// The chunk id of the logical parent, if any.
    pub parent_id: Option<String>,
    /// Path of node identifiers from the document root to here.
    pub path: Vec<String>,
    /// Recursion depth; the root context starts at `0`.
    pub depth: usize,
    /// Shared `sourceId -> chunkId` map.
    pub id_map: SharedIdMap,
}

impl ChunkingContext {
    /// A fresh root context for a new chunking call.
    pub fn root(file_key: impl Into<String>, max_size: usize) -> Self {
        ChunkingContext {
            file_key: file_key.into(),
            max_size,
            parent_id: None,
            path: Vec::new(),
            depth: 0,
            id_map: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Derive a context for a child node: depth+1, path extended, the
    /// same shared id map, and `parent_id` set to this context's own
    /// freshly assigned chunk id.
    pub fn child(&self, parent_chunk_id: impl Into<String>, path_segment: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(path_segment.into());
        ChunkingContext {
            file_key: self.file_key.clone(),
            max_size: self.max_size,
            parent_id: Some(parent_chunk_id.into()),
            path,
            depth: self.depth + 1,
            id_map: Rc::clone(&self.id_map),
        }
    }

    /// Record `source_id -> chunk_id` in the shared id map.
    pub fn register_id(&self, source_id: impl Into<String>, chunk_id: impl Into<String>) {
        self.id_map.borrow_mut().insert(source_id.into(), chunk_id.into());
    }

    /// Look up a previously registered chunk id for `source_id`.
    pub fn lookup_id(&self, source_id: &str) -> Option<String> {
        self.id_map.borrow().get(source_id).cloned()
    }

    /// True if `depth` exceeds `MAX_DEPTH`.
    pub fn depth_exceeded(&self) -> bool {
        self.depth > MAX_DEPTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_shares_id_map() {
        let root = ChunkingContext::root("fk", 1024);
        root.register_id("n1", "fk:node:n1");
        let child = root.child("fk:node:n1", "n1");
        assert_eq!(child.lookup_id("n1"), Some("fk:node:n1".to_string()));

        child.register_id("n2", "fk:node:n2");
        assert_eq!(root.lookup_id("n2"), Some("fk:node:n2".to_string()));
    }

    #[test]
    fn child_increments_depth_and_extends_path() {
        let root = ChunkingContext::root("fk", 1024);
        let child = root.child("p", "seg");
        assert_eq!(child.depth, 1);
        assert_eq!(child.path, vec!["seg".to_string()]);
        assert_eq!(child.parent_id, Some("p".to_string()));
    }

    #[test]
    fn depth_cap_enforced_past_100() {
        let mut ctx = ChunkingContext::root("fk", 1024);
        for i in 0..101 {
            ctx = ctx.child("p", i.to_string());
        }
        assert!(ctx.depth_exceeded());
    }
}
