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
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

/// Current on-disk configuration schema version.
pub const CONFIG_VERSION: u32 = 1;

/// Migration trait for handling config upgrades.
pub trait ConfigMigration {
    /// Get the source version this migration handles.
    fn source_version(&self) -> u32;

    /// Get the target version after migration.
    fn target_version(&self) -> u32;

    /// Execute the migration over the raw JSON tree (before schema
    /// deserialization, so a field rename or restructure doesn't need
    /// to round-trip through the typed `Config`).
    fn migrate(&self, config: Value) -> ConfigResult<Value>;

    /// Get migration description.
    fn description(&self) -> &str;
}

/// Migration manager: a registry of `(from, to)` migrations, applied in
/// sequence to walk a config forward to the current version.
pub struct MigrationManager {
    migrations: HashMap<(u32, u32), Box<dyn ConfigMigration>>,
}

impl MigrationManager {
    /// Create a new migration manager.
    pub fn new() -> Self {
        MigrationManager {
            migrations: HashMap::new(),
        }
    }

    /// Register a migration.
    pub fn register(&mut self, migration: Box<dyn ConfigMigration>) {
        let key = (migration.source_version(), migration.target_version());
        self.migrations.insert(key, migration);
    }

    /// Migrate configuration from one version to another.
    pub fn migrate(&self, mut config: Value, from_version: u32, to_version: u32) -> ConfigResult<Value> {
        if from_version == to_version {
            return Ok(config);
        }

        if from_version > to_version {
            return Err(ConfigError::migration_error(format!(
                "cannot migrate from version {} to lower version {}",
                from_version, to_version
            )));
        }

        let mut current_version = from_version;
        while current_version < to_version {
            let next_version = current_version + 1;
            if next_version > to_version {
                break;
            }

            let key = (current_version, next_version);
            match self.migrations.get(&key) {
                Some(migration) => {
                    debug!(
                        "applying migration from v{} to v{}: {}",
                        current_version,
                        next_version,
                        migration.description()
                    );
                    config = migration.migrate(config)?;
                    info!(
                        "successfully migrated configuration from v{} to v{}",
                        current_version, next_version
                    );
                    current_version = next_version;
                }
                None => {
                    return Err(ConfigError::migration_error(format!(
                        "no migration found from v{} to v{}",
                        current_version, next_version
                    )));
                }
            }
        }

        Ok(config)
    }

    /// Get all registered migrations, described.
    pub fn list_migrations(&self) -> Vec<String> {
        let mut migrations: Vec<_> = self
            .migrations
            .values()
            .map(|m| {
                format!(
                    "v{} -> v{}: {}",
                    m.source_version(),
                    m.target_version(),
                    m.description()
                )
            })
            .collect();
        migrations.sort();
        migrations
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// v0 → v1: the pre-chunker-engine config shape had no `chunker`
/// section at all (storage settings only); add one with defaults, and
/// default the storage `backend` tag to `filesystem` if the field is
/// entirely absent from a hand-written v0 file.
pub struct MigrationV0ToV1;

impl ConfigMigration for MigrationV0ToV1 {
    fn source_version(&self) -> u32 {
        0
    }

    fn target_version(&self) -> u32 {
        1
    }

    fn migrate(&self, mut config: Value) -> ConfigResult<Value> {
        if !config["chunker"].is_object() {
            config["chunker"] = json!({
                "max_chunk_size": 30720,
                "debug": false,
                "optimization_level": "MEDIUM",
                "collect_metrics": false,
                "detect_circular_references": true,
            });
        }

        if config["storage"]["backend"].is_null() {
            config["storage"]["backend"] = json!("filesystem");
        }

        Ok(config)
    }

    fn description(&self) -> &str {
        "add a default chunker section and backend tag for pre-v1 files"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_manager() {
        let mut manager = MigrationManager::new();
        manager.register(Box::new(MigrationV0ToV1));

        let config = json!({"storage": {"backend": "filesystem"}});

        let result = manager.migrate(config, 0, 1);
        assert!(result.is_ok());

        let migrated = result.unwrap();
        assert_eq!(migrated["chunker"]["max_chunk_size"].as_u64(), Some(30720));
    }

    #[test]
    fn test_no_migration_needed() {
        let manager = MigrationManager::new();
        let config = json!({"storage": {"backend": "filesystem"}});

        let result = manager.migrate(config.clone(), 1, 1);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config);
    }

    #[test]
    fn test_invalid_downgrade() {
        let manager = MigrationManager::new();
        let config = json!({"storage": {"backend": "filesystem"}});

        let result = manager.migrate(config, 2, 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_migration_path() {
        let manager = MigrationManager::new();
        let config = json!({"storage": {"backend": "filesystem"}});

        let result = manager.migrate(config, 0, 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_migration_v0_to_v1_fills_missing_backend_tag() {
        let migration = MigrationV0ToV1;
        let config = json!({"storage": {}});

        let result = migration.migrate(config).unwrap();
        assert_eq!(result["storage"]["backend"].as_str(), Some("filesystem"));
        assert_eq!(result["chunker"]["max_chunk_size"].as_u64(), Some(30720));
    }

    #[test]
    fn test_list_migrations() {
        let mut manager = MigrationManager::new();
        manager.register(Box::new(MigrationV0ToV1));

        let migrations = manager.list_migrations();
        assert!(!migrations.is_empty());
        assert!(migrations[0].contains("v0 -> v1"));
    }
}
