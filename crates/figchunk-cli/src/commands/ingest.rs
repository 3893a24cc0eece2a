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

//! Chunk a document and persist every resulting chunk.

use crate::{adapter, output, progress::ProgressTracker, runtime};
use anyhow::{Context, Result};
use clap::Parser;
use figchunk_core::{ChunkType, Chunker};
use figchunk_protocol::GatewayClient;
use std::fs;
use std::path::PathBuf;

/// Chunk a document and persist the result
#[derive(Parser, Debug)]
pub struct IngestCmd {
    /// Path to the JSON document to ingest
    pub input: PathBuf,

    /// Source document key (defaults to the input file's stem)
    #[arg(long)]
    pub file_key: Option<String>,

    /// Force a single strategy instead of auto-detecting (metadata, node, globalVars)
    #[arg(long)]
    pub chunk_type: Option<String>,

    /// Path to figchunk.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the response as JSON instead of a human summary
    #[arg(long)]
    pub json: bool,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl IngestCmd {
    pub async fn execute(&self) -> Result<()> {
        let config = runtime::load_config(self.config.as_deref()).await?;

        let raw = fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let data: serde_json::Value =
            serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", self.input.display()))?;

        let file_key = self.file_key.clone().unwrap_or_else(|| {
            self.input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document")
                .to_string()
        });

        let chunk_type = self
            .chunk_type
            .as_deref()
            .map(|s| ChunkType::parse(s).ok_or_else(|| anyhow::anyhow!("unknown chunk type '{s}'")))
            .transpose()?;

        let storage = adapter::build_adapter(&config).await?;
        let chunker = Chunker::new(config.chunker.clone());
        let client = GatewayClient::new(chunker, storage);

        let progress = ProgressTracker::new(self.quiet || self.json);
        let spinner = progress.spinner(&format!("chunking {}", file_key));
        let response = client.ingest(&file_key, &data, chunk_type).await?;
        spinner.finish_and_clear();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else if !self.quiet {
            output::success(&format!("ingested '{}' into {} chunk(s)", file_key, response.total_chunks));
            output::detail("primary chunk", &response.first_chunk_id);
            for chunk_type in ChunkType::all() {
                if let Some(count) = response.structure_summary.counts.get(&chunk_type) {
                    output::detail(chunk_type.as_str(), &count.to_string());
                }
            }
            output::detail("references", &response.structure_summary.reference_count.to_string());
        }

        Ok(())
    }
}
