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
use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;
use figchunk_core::OptimizationLevel;

/// Validator for configuration settings.
pub trait Validator {
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.chunker.validate()?;
        self.storage.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for figchunk_core::ChunkerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_chunk_size == 0 {
            return Err(ConfigError::invalid_value(
                "chunker.max_chunk_size",
                "must be greater than 0",
            ));
        }
        // OptimizationLevel is a closed enum; any value that
        // deserializes is already valid, this check exists so a future
        // non-exhaustive addition doesn't silently pass.
        match self.optimization_level {
            OptimizationLevel::None
            | OptimizationLevel::Low
            | OptimizationLevel::Medium
            | OptimizationLevel::High => {}
        }
        Ok(())
    }
}

impl Validator for StorageBackendConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            StorageBackendConfig::Filesystem(fs) => fs.validate(),
            StorageBackendConfig::Kv(kv) => kv.validate(),
            StorageBackendConfig::Document(doc) => doc.validate(),
        }
    }
}

impl Validator for FilesystemConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.base_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("storage.base_path".to_string()));
        }
        if self.cleanup_interval_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "storage.cleanup_interval_ms",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}

impl Validator for KvConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.key_prefix.is_empty() {
            return Err(ConfigError::MissingRequired("storage.key_prefix".to_string()));
        }
        self.connection.validate()?;
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "storage.connect_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.command_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "storage.command_timeout_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validator for KvConnectionConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.cluster {
            if self.nodes.is_empty() {
                return Err(ConfigError::MissingRequired("storage.connection.nodes".to_string()));
            }
        } else if self.host.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingRequired("storage.connection.host".to_string()));
        }
        Ok(())
    }
}

impl Validator for DocumentConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.uri.is_empty() {
            return Err(ConfigError::MissingRequired("storage.uri".to_string()));
        }
        if self.database.is_empty() {
            return Err(ConfigError::MissingRequired("storage.database".to_string()));
        }
        if self.collection.is_empty() {
            return Err(ConfigError::MissingRequired("storage.collection".to_string()));
        }
        if !(self.uri.starts_with("mongodb://") || self.uri.starts_with("mongodb+srv://")) {
            return Err(ConfigError::invalid_value(
                "storage.uri",
                "must start with mongodb:// or mongodb+srv://",
            ));
        }
        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        self.metrics.validate()?;
        Ok(())
    }
}

impl Validator for MetricsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            if self.port == 0 {
                return Err(ConfigError::invalid_value(
                    "observability.metrics.port",
                    "must be between 1 and 65535",
                ));
            }
            if !self.endpoint.starts_with('/') {
                return Err(ConfigError::invalid_value(
                    "observability.metrics.endpoint",
                    "must start with /",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_chunk_size_is_rejected() {
        let mut config = Config::default();
        config.chunker.max_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let mut config = Config::default();
        config.observability.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cluster_connection_without_nodes_is_rejected() {
        let mut config = Config::default();
        config.storage = StorageBackendConfig::Kv(KvConfig {
            connection: KvConnectionConfig {
                cluster: true,
                nodes: Vec::new(),
                ..KvConnectionConfig::default()
            },
            ..KvConfig::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn document_uri_must_use_mongodb_scheme() {
        let mut config = Config::default();
        config.storage = StorageBackendConfig::Document(DocumentConfig {
            uri: "http://example.com".to_string(),
            ..DocumentConfig::default()
        });
        assert!(config.validate().is_err());
    }
}
