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

//! Fetch a single persisted chunk by id.

use crate::{adapter, output, runtime};
use anyhow::Result;
use clap::Parser;
use figchunk_core::Chunker;
use figchunk_protocol::GatewayClient;
use std::path::PathBuf;

/// Fetch a single chunk
#[derive(Parser, Debug)]
pub struct FetchCmd {
    /// Source document key the chunk belongs to
    pub file_key: String,

    /// Id of the chunk to fetch
    pub chunk_id: String,

    /// Path to figchunk.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the response as JSON instead of a human summary
    #[arg(long)]
    pub json: bool,
}

impl FetchCmd {
    pub async fn execute(&self) -> Result<()> {
        let config = runtime::load_config(self.config.as_deref()).await?;
        let storage = adapter::build_adapter(&config).await?;
        let chunker = Chunker::new(config.chunker.clone());
        let client = GatewayClient::new(chunker, storage);

        match client.fetch(&self.file_key, &self.chunk_id).await? {
            None => {
                output::warning(&format!("no chunk '{}' for file '{}'", self.chunk_id, self.file_key));
                std::process::exit(1);
            }
            Some(response) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                } else {
                    output::success(&format!("fetched {}", response.chunk_id));
                    output::detail("total chunks", &response.total_chunks.to_string());
                    if let Some(next) = &response.next_chunk_id {
                        output::detail("next chunk", next);
                    }
                    if let Some(metadata) = &response.metadata {
                        println!("{}", serde_json::to_string_pretty(metadata)?);
                    }
                    if let Some(global_vars) = &response.global_vars {
                        println!("{}", serde_json::to_string_pretty(global_vars)?);
                    }
                    for node in &response.nodes {
                        println!("{}", serde_json::to_string_pretty(node)?);
                    }
                }
            }
        }

        Ok(())
    }
}
