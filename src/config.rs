//! Configuration for the valibase CLI
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (valibase.toml)
//! - Environment variables (VALIBASE__*)
//!
//! ## Example config file (valibase.toml):
//! ```toml
//! [schema]
//! path = "./pb_schema.json"
//!
//! [output]
//! format = "pretty"
//! show_received = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValibaseConfig {
    /// Where collection schemas come from
    #[serde(default)]
    pub schema: SchemaSourceConfig,

    /// How results are printed
    #[serde(default)]
    pub output: OutputConfig,
}

/// Schema source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSourceConfig {
    /// PocketBase collections export; the built-in registry is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print the offending value next to each issue
    #[serde(default = "default_true")]
    pub show_received: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            show_received: true,
        }
    }
}

impl ValibaseConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["valibase.toml", ".valibase.toml", "config/valibase.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "zenaxo", "valibase") {
            let xdg_config = config_dir.config_dir().join("valibase.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // VALIBASE__OUTPUT__FORMAT=compact
        builder = builder.add_source(
            Environment::with_prefix("VALIBASE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Schema export path, resolved against the working directory
    pub fn schema_path(&self) -> Option<PathBuf> {
        self.schema.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}
