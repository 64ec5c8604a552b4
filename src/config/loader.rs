//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::paths;
use super::schema::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable overriding `hub.context`
pub const ENV_CONTEXT: &str = "DRLENS_CONTEXT";
/// Environment variable overriding `hub.namespace`
pub const ENV_NAMESPACE: &str = "DRLENS_NAMESPACE";
/// Environment variable overriding `output.format`
pub const ENV_OUTPUT: &str = "DRLENS_OUTPUT";
/// Environment variable overriding `logger.level`
pub const ENV_LOG_LEVEL: &str = "DRLENS_LOG_LEVEL";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        let path = paths::root_config_path();
        let config = if path.exists() {
            match Self::load_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring config file: {:#}", e);
                    Config::default()
                }
            }
        } else {
            Config::default()
        };

        Ok(Self::apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the root config file, if present
    ///
    /// Fails on unreadable files, invalid YAML, invalid value types and
    /// unparseable log filters.
    pub fn validate() -> Result<()> {
        let path = paths::root_config_path();
        if path.exists() {
            let config = Self::load_file(&path)?;
            tracing_subscriber::EnvFilter::try_new(&config.logger.level).with_context(|| {
                format!("logger.level '{}' is not a valid filter", config.logger.level)
            })?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Empty `DRLENS_CONTEXT` / `DRLENS_NAMESPACE` values reset the field
    /// to unset. Invalid `DRLENS_OUTPUT` values are ignored with a warning.
    pub fn apply_env_overrides(
        mut config: Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Config {
        if let Some(context) = lookup(ENV_CONTEXT) {
            config.hub.context = Some(context).filter(|c| !c.is_empty());
        }

        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            config.hub.namespace = Some(namespace).filter(|n| !n.is_empty());
        }

        if let Some(format) = lookup(ENV_OUTPUT) {
            match format.parse() {
                Ok(format) => config.output.format = format,
                Err(e) => tracing::warn!("Ignoring {}: {}", ENV_OUTPUT, e),
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.logger.level = level;
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::OutputFormat;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::apply_env_overrides(
            Config::default(),
            lookup(&[
                (ENV_CONTEXT, "hub-admin"),
                (ENV_OUTPUT, "json"),
                (ENV_LOG_LEVEL, "drlens=debug"),
            ]),
        );

        assert_eq!(config.hub.context.as_deref(), Some("hub-admin"));
        assert_eq!(config.hub.namespace, None);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logger.level, "drlens=debug");
    }

    #[test]
    fn test_empty_env_resets_namespace() {
        let mut config = Config::default();
        config.hub.namespace = Some("openshift-gitops".to_string());

        let config = ConfigLoader::apply_env_overrides(config, lookup(&[(ENV_NAMESPACE, "")]));
        assert_eq!(config.hub.namespace, None);
    }

    #[test]
    fn test_invalid_output_override_is_ignored() {
        let config =
            ConfigLoader::apply_env_overrides(Config::default(), lookup(&[(ENV_OUTPUT, "csv")]));
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.hub.namespace = Some("busybox".to_string());
        ConfigLoader::save(&config, &path).unwrap();

        assert_eq!(ConfigLoader::load_file(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::load_file(&dir.path().join("missing.yaml")).is_err());
    }
}
