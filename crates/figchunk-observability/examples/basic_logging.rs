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
//! Basic logging example demonstrating different output formats.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_logging -- <format>
//! Where <format> is one of: pretty, compact, json

use figchunk_observability::{init_tracing, LogFormat};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let format_str = args.get(1).map(|s| s.as_str()).unwrap_or("pretty");

    let format = LogFormat::from_str(format_str).unwrap_or(LogFormat::Pretty);

    println!("Initializing with format: {:?}", format);
    init_tracing(format, Some("debug"))?;

    tracing::info!("Application started");

    // Simulate some operations with different log levels
    tracing::debug!("This is a debug message");
    tracing::info!("This is an info message");
    tracing::warn!("This is a warning message");

    // Structured logging with fields
    tracing::info!(
        file_key = "file-001",
        duration_ms = 42,
        "Ingesting document"
    );

    // Async operation with span
    let result = chunk_document("file-001").await;
    tracing::info!("Chunking result: {:?}", result);

    tracing::debug!("Application shutting down");

    Ok(())
}

async fn chunk_document(file_key: &str) -> anyhow::Result<String> {
    let span = tracing::debug_span!("chunk_document", ?file_key);
    let _guard = span.enter();

    tracing::debug!("Starting document chunking");

    // Simulate some work
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

    let result = format!("chunked: {}", file_key);
    tracing::debug!(result = %result, "Document chunking complete");

    Ok(result)
}
