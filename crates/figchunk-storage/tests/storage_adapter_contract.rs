//! Integration tests exercising the shared `StorageAdapter` contract
//! against both the in-memory and filesystem realizations.

use figchunk_core::{Chunk, ChunkFilter, ChunkType};
use figchunk_storage::local::{FilesystemAdapter, FilesystemAdapterConfig, HashAlgorithm};
use figchunk_storage::mock::MockAdapter;
use figchunk_storage::StorageAdapter;
use serde_json::json;
use tempfile::tempdir;

async fn roundtrips_modulo_last_accessed(adapter: &dyn StorageAdapter) {
    let chunk = Chunk::new(
        "fk:metadata:core",
        "fk",
        ChunkType::Metadata,
        json!({"name": "design", "version": "3"}),
    );
    adapter.save(&chunk).await.unwrap();
    let fetched = adapter.get(&chunk.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, chunk.id);
    assert_eq!(fetched.file_key, chunk.file_key);
    assert_eq!(fetched.chunk_type, chunk.chunk_type);
    assert_eq!(fetched.data, chunk.data);
    assert_eq!(fetched.created, chunk.created);
    assert!(fetched.last_accessed >= chunk.last_accessed);
}

#[tokio::test]
async fn mock_adapter_satisfies_contract() {
    let adapter = MockAdapter::new();
    roundtrips_modulo_last_accessed(&adapter).await;
}

#[tokio::test]
async fn filesystem_adapter_satisfies_contract() {
    let dir = tempdir().unwrap();
    let adapter = FilesystemAdapter::new(FilesystemAdapterConfig {
        base_path: dir.path().to_path_buf(),
        use_locks: true,
        lock_timeout: std::time::Duration::from_millis(30_000),
        default_ttl: std::time::Duration::from_millis(86_400_000),
        hash_algorithm: HashAlgorithm::Sha1,
    })
    .await
    .unwrap();
    roundtrips_modulo_last_accessed(&adapter).await;
}

#[tokio::test]
async fn has_and_delete_agree_across_adapters() {
    for adapter in adapters().await {
        let chunk = Chunk::new("fk:node:x", "fk", ChunkType::Node, json!({}));
        adapter.save(&chunk).await.unwrap();
        assert!(adapter.has(&chunk.id).await.unwrap());
        assert!(adapter.delete(&chunk.id).await.unwrap());
        assert!(!adapter.has(&chunk.id).await.unwrap());
        assert!(!adapter.delete(&chunk.id).await.unwrap());
    }
}

#[tokio::test]
async fn filter_by_file_key_and_type_narrows_results() {
    for adapter in adapters().await {
        let a = Chunk::new("fileA:node:1", "fileA", ChunkType::Node, json!({}));
        let b = Chunk::new("fileB:node:1", "fileB", ChunkType::Node, json!({}));
        let c = Chunk::new("fileA:metadata:core", "fileA", ChunkType::Metadata, json!({}));
        adapter.save(&a).await.unwrap();
        adapter.save(&b).await.unwrap();
        adapter.save(&c).await.unwrap();

        let mut filter = ChunkFilter::default();
        filter.file_key = Some("fileA".into());
        filter.chunk_type = Some(ChunkType::Node);
        let results = adapter.list(Some(filter)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, a.id);
    }
}

async fn adapters() -> Vec<Box<dyn StorageAdapter>> {
    let dir = tempdir().unwrap();
    let fs_adapter = FilesystemAdapter::new(FilesystemAdapterConfig {
        base_path: dir.path().to_path_buf(),
        use_locks: false,
        lock_timeout: std::time::Duration::from_millis(30_000),
        default_ttl: std::time::Duration::from_millis(86_400_000),
        hash_algorithm: HashAlgorithm::Md5,
    })
    .await
    .unwrap();
    // Leak the tempdir for the duration of the test process; acceptable
    // in a short-lived test binary.
    std::mem::forget(dir);
    vec![Box::new(MockAdapter::new()), Box::new(fs_adapter)]
}
