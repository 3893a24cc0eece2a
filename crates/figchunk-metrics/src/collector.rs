//! Prometheus `Collector` wrapper around [`MetricsRegistry`].
//!
//! Provides a custom Prometheus collector that gathers metrics from
//! chunker and storage operations.

use prometheus::{core::Collector, proto::MetricFamily};
use std::sync::Arc;
use tracing::debug;

use crate::MetricsRegistry;

/// Custom Prometheus collector wrapping a [`MetricsRegistry`].
///
/// Implements the Prometheus `Collector` trait for integration with the
/// wider Prometheus ecosystem (e.g. a process-wide `prometheus::Registry`
/// that also gathers `process_*` metrics).
pub struct FigChunkCollector {
    registry: Arc<MetricsRegistry>,
}

impl FigChunkCollector {
    /// Create a new collector wrapping the given metrics registry.
    pub fn new(registry: MetricsRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Get a reference to the underlying metrics registry.
    pub fn registry(&self) -> &MetricsRegistry {
        &self.registry
    }
}

impl Collector for FigChunkCollector {
    fn desc(&self) -> Vec<&prometheus::core::Desc> {
        // Descriptors are owned by the inner prometheus::Registry, which
        // already validates for name collisions at registration time.
        vec![]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        debug!("collecting figchunk metrics");
        self.registry.registry().gather()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StorageBackendLabel, StorageOperation};

    #[test]
    fn collector_creation() {
        let registry = MetricsRegistry::new().unwrap();
        let collector = FigChunkCollector::new(registry);
        assert_eq!(Arc::strong_count(&collector.registry), 1);
    }

    #[test]
    fn collector_gathers_recorded_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_storage_operation(
            StorageBackendLabel::Filesystem,
            StorageOperation::Save,
            0.01,
            true,
        );

        let collector = FigChunkCollector::new(registry);
        let families = collector.collect();
        assert!(!families.is_empty());

        let names: Vec<String> = families.iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.iter().any(|n| n.contains("storage_operation")));
    }
}
