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

//! Delete every expired chunk.

use crate::{adapter, output, runtime};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Delete expired chunks
#[derive(Parser, Debug)]
pub struct CleanupCmd {
    /// Path to figchunk.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CleanupCmd {
    pub async fn execute(&self) -> Result<()> {
        let config = runtime::load_config(self.config.as_deref()).await?;
        let storage = adapter::build_adapter(&config).await?;

        let removed = storage.cleanup().await?;

        if !self.quiet {
            output::success(&format!("removed {removed} expired chunk(s)"));
        }

        Ok(())
    }
}
