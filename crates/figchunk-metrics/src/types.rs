//! Common types for metrics collection.

use serde::{Deserialize, Serialize};

/// Configuration for the metrics HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Port for metrics HTTP server.
    pub port: u16,

    /// Enable metrics collection.
    pub enabled: bool,

    /// Bind address (default: 127.0.0.1).
    pub bind_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: 9090,
            enabled: false,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create new config with port.
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            enabled: true,
            ..Default::default()
        }
    }

    /// Get bind address with port.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// The three storage backends `figchunk-storage` realizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageBackendLabel {
    /// Sharded-directory filesystem adapter.
    Filesystem,
    /// Redis (or Redis-compatible) key-value adapter.
    Kv,
    /// MongoDB document-store adapter.
    Document,
}

impl StorageBackendLabel {
    /// String label used for the `backend` Prometheus label.
    pub fn as_label(&self) -> &'static str {
        match self {
            StorageBackendLabel::Filesystem => "filesystem",
            StorageBackendLabel::Kv => "kv",
            StorageBackendLabel::Document => "document",
        }
    }
}

/// The uniform `StorageAdapter` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    /// `StorageAdapter::save`.
    Save,
    /// `StorageAdapter::get`.
    Get,
    /// `StorageAdapter::has`.
    Has,
    /// `StorageAdapter::delete`.
    Delete,
    /// `StorageAdapter::list`.
    List,
    /// `StorageAdapter::cleanup`.
    Cleanup,
}

impl StorageOperation {
    /// String label used for the `operation` Prometheus label.
    pub fn as_label(&self) -> &'static str {
        match self {
            StorageOperation::Save => "save",
            StorageOperation::Get => "get",
            StorageOperation::Has => "has",
            StorageOperation::Delete => "delete",
            StorageOperation::List => "list",
            StorageOperation::Cleanup => "cleanup",
        }
    }
}

/// Before/after stage of an optimizer pass, for the size histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerStage {
    /// Size before `ChunkOptimizer::optimize` ran.
    Before,
    /// Size after `ChunkOptimizer::optimize` ran.
    After,
}

impl OptimizerStage {
    /// String label used for the `stage` Prometheus label.
    pub fn as_label(&self) -> &'static str {
        match self {
            OptimizerStage::Before => "before",
            OptimizerStage::After => "after",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_config_default() {
        let config = MetricsConfig::default();
        assert_eq!(config.port, 9090);
        assert!(!config.enabled);
        assert_eq!(config.bind_address, "127.0.0.1");
    }

    #[test]
    fn metrics_config_with_port() {
        let config = MetricsConfig::with_port(8080);
        assert_eq!(config.port, 8080);
        assert!(config.enabled);
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn storage_backend_labels() {
        assert_eq!(StorageBackendLabel::Filesystem.as_label(), "filesystem");
        assert_eq!(StorageBackendLabel::Kv.as_label(), "kv");
        assert_eq!(StorageBackendLabel::Document.as_label(), "document");
    }

    #[test]
    fn storage_operation_labels() {
        assert_eq!(StorageOperation::Save.as_label(), "save");
        assert_eq!(StorageOperation::Get.as_label(), "get");
        assert_eq!(StorageOperation::Cleanup.as_label(), "cleanup");
    }
}
