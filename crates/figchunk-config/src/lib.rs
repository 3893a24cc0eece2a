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
//! Configuration management for FigChunk.
//!
//! Supports multiple formats (TOML, YAML, JSON), `FIGCHUNK_*`
//! environment variable overrides, schema validation, and a migration
//! framework for upgrading on-disk configs written by older versions.
//!
//! # Example
//!
//! ```no_run
//! use figchunk_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader.load_with_overrides("figchunk.toml").await?;
//!
//!     println!("max chunk size: {}", config.chunker.max_chunk_size);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod migration;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use migration::{ConfigMigration, MigrationManager, MigrationV0ToV1, CONFIG_VERSION};
pub use schema::*;
pub use validation::Validator;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = Config::default();
        assert_eq!(config.chunker.max_chunk_size, 30_720);
        assert!(matches!(config.storage, StorageBackendConfig::Filesystem(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("filesystem"));
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.observability.log_level = "invalid_level".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_settings() {
        let mut config = Config::default();
        config.custom.insert(
            "custom_key".to_string(),
            serde_json::json!("custom_value"),
        );

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("custom_key"));
    }
}
