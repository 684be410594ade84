//! Command modules for the symweave CLI
//!
//! Each command module implements a single top-level command:
//! - `apply` - Merge a request file into a symbol file
//! - `inspect` - Show the symbol table of a symbol file
//! - `key` - Render the canonical key of an element
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for output format and verbosity, and return
//! the text to print.

pub mod apply;
pub mod inspect;
pub mod key;

pub use apply::run_apply;
pub use inspect::run_inspect;
pub use key::run_key;

use std::path::PathBuf;

use crate::cli::{LocationArgs, OutputFormat};
use crate::config::{SymbolPaths, SymweaveConfig, ENV_ASSEMBLY_NAME, ENV_EXTENSION, ENV_OUTPUT_DIR};
use crate::error::Result;

/// Shared context passed to all command handlers
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// Output format (text, toon, or json)
    pub format: OutputFormat,
    /// Show verbose output
    pub verbose: bool,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args
    pub fn from_cli(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }
}

/// Encode a JSON value as TOON using the rtoon library
pub fn encode_toon(value: &serde_json::Value) -> String {
    rtoon::encode_default(value).unwrap_or_else(|e| format!("TOON encoding error: {}", e))
}

impl LocationArgs {
    /// Resolve the symbol file path from the explicit path, the location
    /// options (which clap also fills from the environment) and the config file
    pub fn symbol_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.symbols {
            return Ok(path.clone());
        }

        let config = SymweaveConfig::load()?;
        let paths = SymbolPaths::resolve(&config, |name| match name {
            ENV_OUTPUT_DIR => self
                .output_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            ENV_ASSEMBLY_NAME => self.assembly_name.clone(),
            ENV_EXTENSION => self.extension.clone(),
            _ => None,
        })?;
        Ok(paths.symbol_file())
    }
}
