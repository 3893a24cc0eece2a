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

//! Aggregate chunk counts and size by type, over a `list` scan.

use crate::{adapter, output, runtime};
use anyhow::Result;
use clap::Parser;
use figchunk_core::{ChunkFilter, ChunkSummary, ChunkType};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Summarize stored chunks
#[derive(Parser, Debug)]
pub struct StatsCmd {
    /// Restrict to chunks of this source document
    #[arg(long)]
    pub file_key: Option<String>,

    /// Include expired chunks in the aggregate
    #[arg(long)]
    pub include_expired: bool,

    /// Maximum number of summaries to scan
    #[arg(long, default_value_t = 10_000)]
    pub limit: usize,

    /// Path to figchunk.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON instead of a human summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Stats {
    total_chunks: usize,
    total_size_bytes: usize,
    counts_by_type: HashMap<ChunkType, usize>,
}

/// Pure aggregation over a `list` scan, factored out so it's testable
/// without a storage backend.
fn aggregate(summaries: &[ChunkSummary]) -> Stats {
    let mut counts_by_type: HashMap<ChunkType, usize> = HashMap::new();
    let mut total_size_bytes = 0usize;
    for summary in summaries {
        *counts_by_type.entry(summary.chunk_type).or_insert(0) += 1;
        total_size_bytes += summary.size;
    }

    Stats {
        total_chunks: summaries.len(),
        total_size_bytes,
        counts_by_type,
    }
}

impl StatsCmd {
    pub async fn execute(&self) -> Result<()> {
        let config = runtime::load_config(self.config.as_deref()).await?;
        let storage = adapter::build_adapter(&config).await?;

        let filter = ChunkFilter {
            file_key: self.file_key.clone(),
            include_expired: self.include_expired,
            limit: self.limit,
            ..Default::default()
        };
        let summaries = storage.list(Some(filter)).await?;
        let stats = aggregate(&summaries);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        output::header("chunk storage stats");
        output::detail("total chunks", &stats.total_chunks.to_string());
        output::detail("total size", &format!("{} bytes", stats.total_size_bytes));
        for chunk_type in ChunkType::all() {
            if let Some(count) = stats.counts_by_type.get(&chunk_type) {
                output::detail(chunk_type.as_str(), &count.to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(chunk_type: ChunkType, size: usize) -> ChunkSummary {
        ChunkSummary {
            id: format!("f:{}:1", chunk_type.as_str()),
            file_key: "f".to_string(),
            chunk_type,
            created: Utc::now(),
            size,
        }
    }

    #[test]
    fn aggregate_counts_and_sums_size_per_type() {
        let summaries = vec![
            summary(ChunkType::Node, 100),
            summary(ChunkType::Node, 200),
            summary(ChunkType::Metadata, 50),
        ];
        let stats = aggregate(&summaries);
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.total_size_bytes, 350);
        assert_eq!(stats.counts_by_type.get(&ChunkType::Node), Some(&2));
        assert_eq!(stats.counts_by_type.get(&ChunkType::Metadata), Some(&1));
        assert_eq!(stats.counts_by_type.get(&ChunkType::GlobalVars), None);
    }

    #[test]
    fn aggregate_empty_scan_is_zeroed() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert!(stats.counts_by_type.is_empty());
    }
}
