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

//! Document-store (MongoDB) storage adapter.
//!
//! Schema: `{_id=id, fileKey, type, created, expires?, lastAccessed,
//! data, links, size, metadata}`. Unlike the filesystem/KV adapters,
//! this backend stores native BSON dates — no `{__date, value}`
//! sentinel is needed since MongoDB round-trips date fidelity itself.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use figchunk_core::{Chunk, ChunkFilter, ChunkSummary, ChunkType, SortDirection, SortField};
use mongodb::bson::{doc, Bson, DateTime as BsonDateTime, Document};
use mongodb::options::{FindOneAndDeleteOptions, FindOptions, IndexOptions, ReplaceOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

/// TLS / pooling / timeout knobs for the document-adapter `options` block.
#[derive(Debug, Clone, Default)]
pub struct DocumentStoreOptions {
    /// Maximum connection pool size.
    pub max_pool_size: Option<u32>,
    /// Server selection timeout.
    pub server_selection_timeout: Option<StdDuration>,
    /// Connection establishment timeout.
    pub connect_timeout: Option<StdDuration>,
    /// Per-socket read/write timeout.
    pub socket_timeout: Option<StdDuration>,
    /// Path to a CA bundle for TLS, if required.
    pub tls_ca_file: Option<String>,
}

/// Construction parameters for [`DocumentStoreAdapter`].
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Mongo connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Collection name.
    pub collection: String,
    /// Driver-level options.
    pub options: DocumentStoreOptions,
    /// TTL (seconds) applied when a chunk has no explicit `expires`.
    pub default_ttl: StdDuration,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocChunk {
    #[serde(rename = "_id")]
    id: String,
    file_key: String,
    #[serde(rename = "type")]
    chunk_type: ChunkType,
    created: BsonDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires: Option<BsonDateTime>,
    last_accessed: BsonDateTime,
    data: serde_json::Value,
    #[serde(default)]
    links: Vec<String>,
    size: i64,
    #[serde(default)]
    metadata: Document,
}

impl DocChunk {
    fn from_chunk(chunk: &Chunk, size: usize) -> Self {
        DocChunk {
            id: chunk.id.clone(),
            file_key: chunk.file_key.clone(),
            chunk_type: chunk.chunk_type,
            created: BsonDateTime::from_chrono(chunk.created),
            expires: chunk.expires.map(BsonDateTime::from_chrono),
            last_accessed: BsonDateTime::from_chrono(chunk.last_accessed),
            data: chunk.data.clone(),
            links: chunk.links.clone(),
            size: size as i64,
            metadata: Document::new(),
        }
    }
}

impl From<DocChunk> for Chunk {
    fn from(d: DocChunk) -> Self {
        Chunk {
            id: d.id,
            file_key: d.file_key,
            chunk_type: d.chunk_type,
            created: d.created.to_chrono(),
            last_accessed: d.last_accessed.to_chrono(),
            expires: d.expires.map(|e| e.to_chrono()),
            data: d.data,
            links: d.links,
        }
    }
}

/// MongoDB realization of [`crate::StorageAdapter`].
#[derive(Debug, Clone)]
pub struct DocumentStoreAdapter {
    collection: Collection<DocChunk>,
    default_ttl: StdDuration,
}

impl DocumentStoreAdapter {
    /// Connect and build indexes `{fileKey:1}`, `{type:1}`, and a
    /// `{lastAccessed:1}` TTL index with `expireAfterSeconds =
    /// default_ttl`.
    pub async fn new(config: DocumentStoreConfig) -> StorageResult<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StorageError::permanent(format!("invalid mongo uri: {e}")))?;
        client_options.max_pool_size = config.options.max_pool_size;
        client_options.server_selection_timeout = config.options.server_selection_timeout;
        client_options.connect_timeout = config.options.connect_timeout;
        client_options.socket_timeout = config.options.socket_timeout;

        let client = Client::with_options(client_options)
            .map_err(|e| StorageError::permanent(format!("mongo client init failed: {e}")))?;
        let collection: Collection<DocChunk> = client
            .database(&config.database)
            .collection(&config.collection);

        let adapter = DocumentStoreAdapter {
            collection,
            default_ttl: config.default_ttl,
        };
        adapter.ensure_default_indexes().await?;
        Ok(adapter)
    }

    async fn ensure_default_indexes(&self) -> StorageResult<()> {
        let file_key_index = IndexModel::builder().keys(doc! { "file_key": 1 }).build();
        let type_index = IndexModel::builder().keys(doc! { "type": 1 }).build();
        let ttl_index = IndexModel::builder()
            .keys(doc! { "last_accessed": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Some(self.default_ttl))
                    .build(),
            )
            .build();
        for index in [file_key_index, type_index, ttl_index] {
            if let Err(e) = self.collection.create_index(index).await {
                // Index creation races across concurrent adapter
                // instances are benign (already-exists); anything else
                // is a permanent misconfiguration.
                tracing::warn!(error = %e, "index creation failed or already exists");
            }
        }
        Ok(())
    }

    /// Accept an array of chunks and issue one batched upsert. Empty
    /// input is a no-op.
    pub async fn bulk_write(&self, chunks: &[Chunk]) -> StorageResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        for chunk in chunks {
            let size = serde_json::to_vec(&chunk.data).map(|v| v.len()).unwrap_or(0);
            let doc_chunk = DocChunk::from_chunk(chunk, size);
            self.collection
                .replace_one(doc! { "_id": &chunk.id }, doc_chunk)
                .with_options(ReplaceOptions::builder().upsert(true).build())
                .await
                .map_err(|e| StorageError::transient(format!("bulk upsert failed: {e}")))?;
        }
        Ok(())
    }

    /// Forward an opaque aggregation pipeline; the adapter only
    /// forwards, applying no validation of its own.
    pub async fn aggregate(&self, pipeline: Vec<Document>) -> StorageResult<Vec<Document>> {
        use futures_util::TryStreamExt;
        let mut cursor = self
            .collection
            .clone_with_type::<Document>()
            .aggregate(pipeline)
            .await
            .map_err(|e| StorageError::transient(format!("aggregate failed: {e}")))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StorageError::transient(format!("aggregate cursor failed: {e}")))
    }
}

fn filter_to_document(filter: &ChunkFilter, now: chrono::DateTime<Utc>) -> Document {
    let mut doc = Document::new();
    if let Some(ref fk) = filter.file_key {
        doc.insert("file_key", fk.clone());
    }
    if let Some(t) = filter.chunk_type {
        doc.insert("type", t.as_str());
    }
    let mut created_range = Document::new();
    if let Some(older) = filter.older_than {
        created_range.insert("$lt", Bson::DateTime(BsonDateTime::from_chrono(older)));
    }
    if let Some(newer) = filter.newer_than {
        created_range.insert("$gt", Bson::DateTime(BsonDateTime::from_chrono(newer)));
    }
    if !created_range.is_empty() {
        doc.insert("created", created_range);
    }
    if !filter.include_expired {
        doc.insert(
            "$or",
            vec![
                doc! { "expires": { "$exists": false } },
                doc! { "expires": { "$gt": Bson::DateTime(BsonDateTime::from_chrono(now)) } },
            ],
        );
    }
    doc
}

fn sort_document(filter: &ChunkFilter) -> Document {
    let field = match filter.sort_by {
        SortField::Id => "_id",
        SortField::FileKey => "file_key",
        SortField::Type => "type",
        SortField::Created => "created",
        SortField::Size => "size",
    };
    let dir = match filter.sort_direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => -1,
    };
    doc! { field: dir }
}

#[async_trait]
impl crate::StorageAdapter for DocumentStoreAdapter {
    async fn save(&self, chunk: &Chunk) -> StorageResult<()> {
        let mut chunk = chunk.clone();
        if chunk.expires.is_none() {
            chunk.expires = Some(
                chunk.created
                    + chrono::Duration::from_std(self.default_ttl).unwrap_or_else(|_| chrono::Duration::zero()),
            );
        }
        let size = serde_json::to_vec(&chunk.data).map(|v| v.len()).unwrap_or(0);
        let doc_chunk = DocChunk::from_chunk(&chunk, size);
        self.collection
            .replace_one(doc! { "_id": &chunk.id }, doc_chunk)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await
            .map_err(|e| StorageError::transient(format!("upsert failed: {e}")))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Chunk>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| StorageError::transient(format!("find_one failed: {e}")))?;
        let Some(doc_chunk) = found else { return Ok(None) };
        let mut chunk: Chunk = doc_chunk.into();
        if let Some(expires) = chunk.expires {
            if expires < Utc::now() {
                return Ok(None);
            }
        }
        chunk.last_accessed = Utc::now();
        if let Err(e) = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_accessed": Bson::DateTime(BsonDateTime::from_chrono(chunk.last_accessed)) } },
            )
            .await
        {
            tracing::warn!(id = %id, error = %e, "failed to refresh last_accessed");
        }
        Ok(Some(chunk))
    }

    async fn has(&self, id: &str) -> StorageResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "_id": id })
            .await
            .map_err(|e| StorageError::transient(format!("count_documents failed: {e}")))?;
        Ok(count > 0)
    }

    async fn delete(&self, id: &str) -> StorageResult<bool> {
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .with_options(FindOneAndDeleteOptions::default())
            .await
            .map_err(|e| StorageError::transient(format!("delete failed: {e}")))?;
        Ok(deleted.is_some())
    }

    async fn list(&self, filter: Option<ChunkFilter>) -> StorageResult<Vec<ChunkSummary>> {
        use futures_util::TryStreamExt;
        let filter = filter.unwrap_or_default();
        let now = Utc::now();
        let query = filter_to_document(&filter, now);
        let options = FindOptions::builder()
            .sort(sort_document(&filter))
            .limit(filter.limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(query)
            .with_options(options)
            .await
            .map_err(|e| StorageError::transient(format!("find failed: {e}")))?;
        let mut summaries = Vec::new();
        while let Some(doc_chunk) = cursor
            .try_next()
            .await
            .map_err(|e| StorageError::transient(format!("cursor iteration failed: {e}")))?
        {
            let size = doc_chunk.size as usize;
            let chunk: Chunk = doc_chunk.into();
            summaries.push(chunk.summary(size));
        }
        Ok(summaries)
    }

    async fn cleanup(&self) -> StorageResult<usize> {
        let now = Bson::DateTime(BsonDateTime::from_chrono(Utc::now()));
        let result = self
            .collection
            .delete_many(doc! { "expires": { "$lt": now } })
            .await
            .map_err(|e| StorageError::transient(format!("delete_many failed: {e}")))?;
        Ok(result.deleted_count as usize)
    }
}
