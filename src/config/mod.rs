//! Configuration system for drlens
//!
//! Built-in defaults, overlaid by the root config file, overlaid by
//! `DRLENS_*` environment variables.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, HubConfig, LoggerConfig, OutputConfig, OutputFormat};

/// Keys accepted by `get_config_value` / `set_config_value`
pub const CONFIG_KEYS: &[&str] = &[
    "hub.context",
    "hub.namespace",
    "output.format",
    "output.showUnprotected",
    "logger.level",
];

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &schema::Config, key: &str) -> anyhow::Result<String> {
    match key {
        "hub.context" => Ok(config.hub.context.clone().unwrap_or_default()),
        "hub.namespace" => Ok(config.hub.namespace.clone().unwrap_or_default()),
        "output.format" => Ok(config.output.format.to_string()),
        "output.showUnprotected" => Ok(config.output.show_unprotected.to_string()),
        "logger.level" => Ok(config.logger.level.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
///
/// An empty value unsets `hub.context` and `hub.namespace`.
pub fn set_config_value(config: &mut schema::Config, key: &str, value: &str) -> anyhow::Result<()> {
    use anyhow::Context;
    match key {
        "hub.context" => {
            config.hub.context = Some(value.to_string()).filter(|v| !v.is_empty());
        }
        "hub.namespace" => {
            config.hub.namespace = Some(value.to_string()).filter(|v| !v.is_empty());
        }
        "output.format" => {
            config.output.format = value.parse()?;
        }
        "output.showUnprotected" => {
            config.output.show_unprotected = value
                .parse()
                .context("output.showUnprotected must be 'true' or 'false'")?;
        }
        "logger.level" => {
            tracing_subscriber::EnvFilter::try_new(value)
                .with_context(|| format!("'{}' is not a valid log filter", value))?;
            config.logger.level = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
