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

//! List chunk summaries matching a filter.

use crate::{adapter, output, runtime};
use anyhow::Result;
use clap::Parser;
use figchunk_core::{ChunkFilter, ChunkType};
use std::path::PathBuf;

/// List stored chunks
#[derive(Parser, Debug)]
pub struct ListCmd {
    /// Restrict to chunks of this source document
    #[arg(long)]
    pub file_key: Option<String>,

    /// Restrict to chunks of this type (metadata, node, globalVars)
    #[arg(long)]
    pub chunk_type: Option<String>,

    /// Include chunks past their expiry
    #[arg(long)]
    pub include_expired: bool,

    /// Maximum number of summaries to list
    #[arg(long, default_value_t = 100)]
    pub limit: usize,

    /// Path to figchunk.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListCmd {
    pub async fn execute(&self) -> Result<()> {
        let config = runtime::load_config(self.config.as_deref()).await?;
        let storage = adapter::build_adapter(&config).await?;

        let chunk_type = self
            .chunk_type
            .as_deref()
            .map(|s| ChunkType::parse(s).ok_or_else(|| anyhow::anyhow!("unknown chunk type '{s}'")))
            .transpose()?;

        let filter = ChunkFilter {
            file_key: self.file_key.clone(),
            chunk_type,
            include_expired: self.include_expired,
            limit: self.limit,
            ..Default::default()
        };

        let summaries = storage.list(Some(filter)).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            return Ok(());
        }

        if summaries.is_empty() {
            output::info("no chunks found");
            return Ok(());
        }

        for summary in &summaries {
            println!(
                "{:<40} {:<10} {:<28} {:>8} B",
                summary.id,
                summary.chunk_type.as_str(),
                summary.created.to_rfc3339(),
                summary.size
            );
        }
        output::detail("total listed", &summaries.len().to_string());

        Ok(())
    }
}
