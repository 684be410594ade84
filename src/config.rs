//! symweave configuration
//!
//! The symbol file lives at `<output-dir>/<assembly-name>.<extension>`.
//! Each part is resolved from, in order of precedence:
//!
//! 1. environment variables (`SYMWEAVE_OUTPUT_DIR`, `SYMWEAVE_ASSEMBLY_NAME`,
//!    `SYMWEAVE_EXTENSION`)
//! 2. the `[output]` table of the configuration file
//!    (`$SYMWEAVE_CONFIG`, else `~/.config/symweave/config.toml`)
//! 3. defaults (extension only)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SymweaveError};
use crate::fs_utils;

pub const ENV_CONFIG: &str = "SYMWEAVE_CONFIG";
pub const ENV_OUTPUT_DIR: &str = "SYMWEAVE_OUTPUT_DIR";
pub const ENV_ASSEMBLY_NAME: &str = "SYMWEAVE_ASSEMBLY_NAME";
pub const ENV_EXTENSION: &str = "SYMWEAVE_EXTENSION";

/// Default symbol file extension
pub const DEFAULT_EXTENSION: &str = "psym";

/// symweave configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SymweaveConfig {
    /// Symbol file location
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Symbol file location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default)]
    pub assembly_name: Option<String>,

    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            assembly_name: None,
            extension: default_extension(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SymweaveConfig {
    /// Default configuration file path
    pub fn default_path() -> PathBuf {
        match std::env::var(ENV_CONFIG) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => fs_utils::config_base_dir().join("config.toml"),
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a specific path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SymweaveError::Config {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })
    }
}

/// Resolved location of the symbol file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolPaths {
    pub output_dir: PathBuf,
    pub assembly_name: String,
    pub extension: String,
}

impl SymbolPaths {
    pub fn new(output_dir: impl Into<PathBuf>, assembly_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            assembly_name: assembly_name.into(),
            extension: default_extension(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// `<output-dir>/<assembly-name>.<extension>`
    pub fn symbol_file(&self) -> PathBuf {
        let extension = self.extension.trim_start_matches('.');
        self.output_dir
            .join(format!("{}.{}", self.assembly_name, extension))
    }

    /// Resolve from the process environment and the default config file
    pub fn from_env() -> Result<Self> {
        let config = SymweaveConfig::load()?;
        Self::resolve(&config, |name| std::env::var(name).ok())
    }

    /// Resolve with `lookup` standing in for the environment
    pub fn resolve<F>(config: &SymweaveConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let output_dir = get(ENV_OUTPUT_DIR)
            .map(PathBuf::from)
            .or_else(|| config.output.dir.clone())
            .ok_or_else(|| SymweaveError::Config {
                message: format!("output directory unknown; set {}", ENV_OUTPUT_DIR),
            })?;

        let assembly_name = get(ENV_ASSEMBLY_NAME)
            .or_else(|| config.output.assembly_name.clone())
            .ok_or_else(|| SymweaveError::Config {
                message: format!("assembly name unknown; set {}", ENV_ASSEMBLY_NAME),
            })?;

        let extension = get(ENV_EXTENSION).unwrap_or_else(|| config.output.extension.clone());

        Ok(Self {
            output_dir,
            assembly_name,
            extension,
        })
    }
}
