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
//! Async context propagation example
//!
//! Demonstrates how tracing context is automatically propagated
//! across async tasks in a tokio runtime.
//!
//! Run with: RUST_LOG=debug cargo run --example async_tracing

use figchunk_observability::{init_tracing, LogFormat};
use std::time::Duration;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::Pretty, Some("debug"))?;

    tracing::info!("Starting async tracing example");

    // Create a root span for the entire operation
    let root_span = tracing::info_span!("ingest_document", file_key = "file-001");

    root_span.in_scope(|| {
        tracing::info!("Inside root span");
    });

    // Spawn multiple async tasks with automatic span inheritance
    let handle1 = tokio::spawn(
        async {
            chunk_subtree("node:1", 3).await
        }
        .instrument(tracing::info_span!("node_strategy", root_id = "node:1")),
    );

    let handle2 = tokio::spawn(
        async {
            chunk_subtree("node:2", 2).await
        }
        .instrument(tracing::info_span!("node_strategy", root_id = "node:2")),
    );

    // Wait for both to complete
    let _ = tokio::join!(handle1, handle2);

    tracing::info!("All operations complete");

    Ok(())
}

async fn chunk_subtree(root_id: &str, child_count: usize) {
    let span = tracing::debug_span!("split_children", root_id, child_count);
    let _guard = span.enter();

    for i in 0..child_count {
        tracing::debug!(child_index = i, "Chunking child node");
        chunk_node(i).await;
    }

    tracing::info!("Subtree chunking complete");
}

async fn chunk_node(index: usize) {
    let span = tracing::trace_span!("chunk_node", index);
    let _guard = span.enter();

    tracing::trace!("Starting node chunking");

    // Simulate async work
    tokio::time::sleep(Duration::from_millis(10)).await;

    tracing::trace!(status = "completed", "Node chunking finished");
}
