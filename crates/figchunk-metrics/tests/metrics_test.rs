//! Integration tests for the `figchunk-metrics` crate.
//!
//! Tests the public API of the metrics module: registry creation,
//! metric recording, and Prometheus export format.

use figchunk_core::ChunkType;
use figchunk_metrics::types::{OptimizerStage, StorageBackendLabel, StorageOperation};
use figchunk_metrics::{Encoder, MetricsRegistry, TextEncoder};

#[test]
fn metrics_registry_creation() {
    let registry = MetricsRegistry::new();
    assert!(registry.is_ok(), "MetricsRegistry should create successfully");
}

#[test]
fn storage_operation_metrics() {
    let registry = MetricsRegistry::new().unwrap();

    registry.record_storage_operation(StorageBackendLabel::Filesystem, StorageOperation::Save, 0.01, true);
    registry.record_storage_operation(StorageBackendLabel::Filesystem, StorageOperation::Get, 0.002, true);
    registry.record_storage_operation(StorageBackendLabel::Kv, StorageOperation::Delete, 0.05, false);

    let families = registry.registry().gather();
    assert!(!families.is_empty());
}

#[test]
fn cleanup_and_lock_metrics() {
    let registry = MetricsRegistry::new().unwrap();

    registry.record_cleanup_evicted(StorageBackendLabel::Filesystem, 7);
    registry.record_cleanup_evicted(StorageBackendLabel::Document, 0);
    registry.record_lock_unavailable();
    registry.record_lock_unavailable();

    let families = registry.registry().gather();
    let names: Vec<String> = families.iter().map(|f| f.get_name().to_string()).collect();
    assert!(names.iter().any(|n| n.contains("cleanup_evicted")));
    assert!(names.iter().any(|n| n.contains("lock_unavailable")));
}

#[test]
fn chunker_metrics() {
    let registry = MetricsRegistry::new().unwrap();

    for t in ChunkType::all() {
        registry.record_chunk(t, 1024);
        registry.record_chunk_duration(t, 0.003);
    }
    registry.record_cycles_detected();

    let families = registry.registry().gather();
    let names: Vec<String> = families.iter().map(|f| f.get_name().to_string()).collect();
    assert!(names.iter().any(|n| n.contains("chunk_count")));
    assert!(names.iter().any(|n| n.contains("chunk_duration")));
    assert!(names.iter().any(|n| n.contains("cycles_detected")));
}

#[test]
fn optimizer_metrics() {
    let registry = MetricsRegistry::new().unwrap();

    registry.record_optimizer_size(OptimizerStage::Before, 4096);
    registry.record_optimizer_size(OptimizerStage::After, 1024);

    let families = registry.registry().gather();
    assert!(families.iter().any(|f| f.get_name().contains("optimizer_size")));
}

#[test]
fn prometheus_export_format() {
    let registry = MetricsRegistry::new().unwrap();

    registry.record_storage_operation(StorageBackendLabel::Filesystem, StorageOperation::Save, 0.01, true);
    registry.record_chunk(ChunkType::Node, 512);

    let encoder = TextEncoder::new();
    let metric_families = registry.registry().gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    let output = String::from_utf8(buffer).unwrap();
    assert!(output.contains("# HELP"));
    assert!(output.contains("figchunk_storage_operation_total"));
}

#[test]
fn registry_is_thread_safe() {
    use std::sync::Arc;
    use std::thread;

    let registry = Arc::new(MetricsRegistry::new().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let reg = Arc::clone(&registry);
            thread::spawn(move || {
                for j in 0..100 {
                    reg.record_storage_operation(
                        StorageBackendLabel::Filesystem,
                        StorageOperation::Save,
                        j as f64 / 1000.0,
                        i % 2 == 0,
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
