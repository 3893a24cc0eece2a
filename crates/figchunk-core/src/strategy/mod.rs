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

//! Type-specific split algorithms, dispatched by the orchestrator on a
//! tagged `ChunkType` rather than a class hierarchy.

mod global_vars;
mod metadata;
mod node;

pub use global_vars::GlobalVarsStrategy;
pub use metadata::MetadataStrategy;
pub use node::NodeStrategy;

use crate::context::ChunkingContext;
use crate::error::Result;
use crate::model::{ChunkResult, ChunkType};
use async_trait::async_trait;
use serde_json::Value;

/// Shared contract every strategy implements.
///
/// Implementations must: register every source id they process into
/// `ctx.id_map`; emit `links` only to ids they or siblings in the same
/// call produced; and bound their own recursion by the context's depth
/// cap rather than blocking indefinitely.
///
/// `?Send` because `ChunkingContext::id_map` is an `Rc<RefCell<_>>` —
/// strategies are confined to a single task by contract, so there is no
/// need to pay for atomics here.
#[async_trait(?Send)]
pub trait ChunkStrategy {
    /// Split `data` into a `ChunkResult` under `ctx`.
    async fn chunk(&self, data: &Value, ctx: &ChunkingContext) -> Result<ChunkResult>;

    /// Would `chunk` split `data` into more than one chunk?
    fn should_chunk(&self, data: &Value, ctx: &ChunkingContext) -> bool;

    /// The `ChunkType` this strategy handles.
    fn chunk_type(&self) -> ChunkType;
}
