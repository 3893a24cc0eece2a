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
use crate::schema::Config;
use crate::validation::Validator;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader: file I/O, format dispatch, env overrides.
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation.
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file.
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let format = ConfigFormat::from_path(path)?;

        info!(
            "loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string.
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config = match format {
            ConfigFormat::Toml => self.parse_toml(content)?,
            ConfigFormat::Yaml => self.parse_yaml(content)?,
            ConfigFormat::Json => self.parse_json(content)?,
        };

        debug!("configuration loaded from {}", format.name());

        if self.validate {
            config.validate()?;
            info!("configuration validated successfully");
        }

        Ok(config)
    }

    /// Load configuration, then apply `FIGCHUNK_*` environment overrides.
    pub async fn load_with_overrides<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let mut config = self.load_file(path).await?;
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Load with defaults if the file is absent, then apply overrides.
    /// Used by the CLI, which should run against an empty environment.
    pub async fn load_with_overrides_or_default<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ConfigResult<Config> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            self.load_file(path).await?
        } else {
            debug!("no configuration file at {}, using defaults", path.display());
            Config::default()
        };
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Merge multiple configuration files, later files taking precedence.
    pub async fn load_and_merge<P: AsRef<Path>>(&self, paths: &[P]) -> ConfigResult<Config> {
        if paths.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one configuration file must be provided".to_string(),
            ));
        }

        let mut merged = self.load_file(&paths[0]).await?;

        for path in &paths[1..] {
            let config = self.load_file(path).await?;
            self.merge_configs(&mut merged, &config);
        }

        if self.validate {
            merged.validate()?;
        }

        Ok(merged)
    }

    /// Parse TOML configuration.
    fn parse_toml(&self, content: &str) -> ConfigResult<Config> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse YAML configuration.
    fn parse_yaml(&self, content: &str) -> ConfigResult<Config> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Parse JSON configuration.
    fn parse_json(&self, content: &str) -> ConfigResult<Config> {
        let config: Config = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Apply `FIGCHUNK_*` environment variable overrides.
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        use crate::schema::StorageBackendConfig;

        if let Ok(value) = std::env::var("FIGCHUNK_MAX_CHUNK_SIZE") {
            config.chunker.max_chunk_size = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    "FIGCHUNK_MAX_CHUNK_SIZE",
                    &value,
                    "expected a positive integer",
                )
            })?;
        }
        if let Ok(value) = std::env::var("FIGCHUNK_DEBUG") {
            config.chunker.debug = parse_bool(&value)?;
        }
        if let Ok(value) = std::env::var("FIGCHUNK_COLLECT_METRICS") {
            config.chunker.collect_metrics = parse_bool(&value)?;
        }

        if let Ok(value) = std::env::var("FIGCHUNK_LOG_LEVEL") {
            config.observability.log_level = value;
        }
        if let Ok(value) = std::env::var("FIGCHUNK_LOG_FORMAT") {
            config.observability.log_format = value;
        }
        if let Ok(value) = std::env::var("FIGCHUNK_METRICS_ENABLED") {
            config.observability.metrics.enabled = parse_bool(&value)?;
        }
        if let Ok(value) = std::env::var("FIGCHUNK_METRICS_PORT") {
            config.observability.metrics.port = value.parse().map_err(|_| {
                ConfigError::env_var_parsing_error(
                    "FIGCHUNK_METRICS_PORT",
                    &value,
                    "expected a valid port number",
                )
            })?;
        }

        if let Ok(value) = std::env::var("FIGCHUNK_STORAGE_BASE_PATH") {
            if let StorageBackendConfig::Filesystem(fs) = &mut config.storage {
                fs.base_path = value.into();
            }
        }
        if let Ok(value) = std::env::var("FIGCHUNK_STORAGE_URI") {
            if let StorageBackendConfig::Document(doc) = &mut config.storage {
                doc.uri = value;
            }
        }

        Ok(())
    }

    /// Merge second config into first (second takes precedence).
    fn merge_configs(&self, base: &mut Config, overlay: &Config) {
        base.chunker = overlay.chunker.clone();
        base.storage = overlay.storage.clone();
        base.observability = overlay.observability.clone();

        for (key, value) in &overlay.custom {
            base.custom.insert(key.clone(), value.clone());
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse boolean from string (accepts: true, false, yes, no, 1, 0, on, off).
fn parse_bool(value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::env_var_parsing_error(
            "BOOL_VALUE",
            value,
            "expected 'true', 'false', 'yes', 'no', '1', '0', 'on', or 'off'",
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::StorageBackendConfig;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("config.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("config.yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(ConfigFormat::from_path("config.xml").is_err());
        assert!(ConfigFormat::from_path("config").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("yes").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(parse_bool("on").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("no").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("invalid").is_err());
    }

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::without_validation();
        let json = r#"{"chunker": {"max_chunk_size": 4096}}"#;
        let config = loader.load_from_string(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.chunker.max_chunk_size, 4096);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::without_validation();
        let toml = r#"
        [chunker]
        max_chunk_size = 8192
        "#;
        let config = loader.load_from_string(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.chunker.max_chunk_size, 8192);
    }

    #[test]
    fn test_parse_yaml() {
        let loader = ConfigLoader::without_validation();
        let yaml = "chunker:\n  max_chunk_size: 2048\n";
        let config = loader.load_from_string(yaml, ConfigFormat::Yaml);
        if let Err(e) = &config {
            eprintln!("YAML parse error: {:?}", e);
        }
        assert_eq!(config.unwrap().chunker.max_chunk_size, 2048);
    }

    #[test]
    fn env_override_switches_filesystem_base_path() {
        std::env::set_var("FIGCHUNK_STORAGE_BASE_PATH", "/tmp/figchunk-test-override");
        let loader = ConfigLoader::without_validation();
        let mut config = Config::default();
        loader.apply_env_overrides(&mut config).unwrap();
        std::env::remove_var("FIGCHUNK_STORAGE_BASE_PATH");
        match config.storage {
            StorageBackendConfig::Filesystem(fs) => {
                assert_eq!(fs.base_path.to_str().unwrap(), "/tmp/figchunk-test-override");
            }
            other => panic!("expected filesystem backend, got {other:?}"),
        }
    }
}
