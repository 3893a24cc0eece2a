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

//! Benchmarks for the filesystem adapter's save/get path: shard hashing,
//! atomic write, and the lock-file dance, under a tokio runtime.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use figchunk_core::{Chunk, ChunkType};
use figchunk_storage::local::{FilesystemAdapter, FilesystemAdapterConfig, HashAlgorithm};
use figchunk_storage::StorageAdapter;
use serde_json::json;
use tempfile::tempdir;

fn bench_save(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = tempdir().unwrap();
    let adapter = rt.block_on(async {
        FilesystemAdapter::new(FilesystemAdapterConfig {
            base_path: dir.path().to_path_buf(),
            use_locks: true,
            lock_timeout: std::time::Duration::from_millis(30_000),
            default_ttl: std::time::Duration::from_millis(86_400_000),
            hash_algorithm: HashAlgorithm::Md5,
        })
        .await
        .unwrap()
    });

    let mut group = c.benchmark_group("filesystem_adapter_save");
    for payload_kb in [1usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(payload_kb), &payload_kb, |b, &kb| {
            let data = json!({ "blob": "x".repeat(kb * 1024) });
            b.to_async(&rt).iter(|| {
                let adapter = &adapter;
                let data = data.clone();
                async move {
                    let chunk = Chunk::new(
                        format!("bench:node:{}", rand_suffix()),
                        "bench",
                        ChunkType::Node,
                        data,
                    );
                    adapter.save(&chunk).await.unwrap();
                }
            });
        });
    }
    group.finish();
}

fn rand_suffix() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

criterion_group!(benches, bench_save);
criterion_main!(benches);
