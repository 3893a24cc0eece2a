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

//! Config loading and adapter construction shared by every subcommand.

use anyhow::{Context, Result};
use figchunk_config::{Config, ConfigLoader};
use std::path::{Path, PathBuf};

/// Load `figchunk.toml` (or the path given on the command line),
/// falling back to built-in defaults when it doesn't exist — the CLI
/// should run against an empty environment.
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("figchunk.toml"));
    ConfigLoader::new()
        .load_with_overrides_or_default(&path)
        .await
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}
