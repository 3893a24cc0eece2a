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

//! Write a default `figchunk.toml` into a directory.

use anyhow::{Context, Result};
use clap::Parser;
use figchunk_config::{Config, DocumentConfig, KvConfig, StorageBackendConfig};
use std::fs;
use std::path::PathBuf;

/// Write a default configuration file
#[derive(Parser, Debug)]
pub struct InitCmd {
    /// Directory to write `figchunk.toml` into (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Storage backend to configure (filesystem, kv, document)
    #[arg(long, default_value = "filesystem")]
    pub backend: String,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl InitCmd {
    pub async fn execute(&self) -> Result<()> {
        use crate::output;

        let dir = match &self.path {
            Some(p) => PathBuf::from(p),
            None => std::env::current_dir().context("failed to get current directory")?,
        };
        fs::create_dir_all(&dir).with_context(|| format!("failed to create directory {}", dir.display()))?;

        let config_path = dir.join("figchunk.toml");
        if config_path.exists() && !self.force {
            anyhow::bail!(
                "{} already exists; pass --force to overwrite",
                config_path.display()
            );
        }

        let mut config = Config::default();
        config.storage = match self.backend.as_str() {
            "filesystem" => StorageBackendConfig::default(),
            "kv" => StorageBackendConfig::Kv(KvConfig::default()),
            "document" => StorageBackendConfig::Document(DocumentConfig::default()),
            other => anyhow::bail!("unknown backend '{other}': expected filesystem, kv, or document"),
        };

        let content = toml::to_string_pretty(&config).context("failed to serialize default config")?;
        fs::write(&config_path, content)
            .with_context(|| format!("failed to write {}", config_path.display()))?;

        if !self.quiet {
            output::success(&format!("wrote {}", config_path.display()));
            output::detail("storage backend", &self.backend);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(path: &std::path::Path, backend: &str, force: bool) -> InitCmd {
        InitCmd {
            path: Some(path.to_string_lossy().into_owned()),
            backend: backend.to_string(),
            force,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn writes_default_filesystem_config() {
        let dir = tempfile::tempdir().unwrap();
        cmd(dir.path(), "filesystem", false).execute().await.unwrap();

        let content = fs::read_to_string(dir.path().join("figchunk.toml")).unwrap();
        assert!(content.contains("backend = \"filesystem\""));
    }

    #[tokio::test]
    async fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        cmd(dir.path(), "filesystem", false).execute().await.unwrap();
        let result = cmd(dir.path(), "filesystem", false).execute().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn force_overwrites_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        cmd(dir.path(), "filesystem", false).execute().await.unwrap();
        cmd(dir.path(), "kv", true).execute().await.unwrap();

        let content = fs::read_to_string(dir.path().join("figchunk.toml")).unwrap();
        assert!(content.contains("backend = \"kv\""));
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = cmd(dir.path(), "s3", false).execute().await;
        assert!(result.is_err());
    }
}
