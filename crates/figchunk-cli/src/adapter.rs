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

//! Builds a [`StorageAdapter`] from a loaded [`Config`]'s
//! `StorageBackendConfig`. The three adapters have different
//! construction signatures (`KvAdapter::new` connects lazily and is
//! synchronous; the other two connect eagerly and are async) so this
//! is a thin dispatcher rather than a trait method.

use anyhow::{Context, Result};
use figchunk_config::{Config, StorageBackendConfig};
use figchunk_storage::{DocumentStoreAdapter, FilesystemAdapter, KvAdapter, StorageAdapter};
use std::sync::Arc;

/// Construct the adapter named by `config.storage`.
pub async fn build_adapter(config: &Config) -> Result<Arc<dyn StorageAdapter>> {
    match &config.storage {
        StorageBackendConfig::Filesystem(fs_config) => {
            let adapter = FilesystemAdapter::new(fs_config.to_adapter_config())
                .await
                .context("failed to open filesystem storage backend")?;
            Ok(Arc::new(adapter))
        }
        StorageBackendConfig::Kv(kv_config) => {
            let adapter = KvAdapter::new(kv_config.to_adapter_config());
            Ok(Arc::new(adapter))
        }
        StorageBackendConfig::Document(doc_config) => {
            let adapter = DocumentStoreAdapter::new(doc_config.to_adapter_config())
                .await
                .context("failed to connect to document-store storage backend")?;
            Ok(Arc::new(adapter))
        }
    }
}
