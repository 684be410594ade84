//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{ENV_ASSEMBLY_NAME, ENV_EXTENSION, ENV_OUTPUT_DIR};

/// Merge element descriptions into hover symbol files
#[derive(Parser, Debug)]
#[command(name = "symweave")]
#[command(about = "Merges queued element descriptions into externally generated symbol files")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "text", value_enum, global = true)]
    pub format: OutputFormat,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for symweave
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge a JSON file of description requests into a symbol file
    Apply(ApplyArgs),

    /// Show the symbol table and node counts of a symbol file
    Inspect(InspectArgs),

    /// Print the canonical key of an element given as JSON
    Key(KeyArgs),
}

// ============================================
// Symbol file location
// ============================================

/// Where the symbol file is; defaults to `<output-dir>/<assembly-name>.<extension>`
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Symbol file path (overrides the location options below)
    #[arg(value_name = "SYMBOLS")]
    pub symbols: Option<PathBuf>,

    /// Build output directory containing the symbol file
    #[arg(long, value_name = "DIR", env = ENV_OUTPUT_DIR)]
    pub output_dir: Option<PathBuf>,

    /// Assembly name the symbol file is named after
    #[arg(long, value_name = "NAME", env = ENV_ASSEMBLY_NAME)]
    pub assembly_name: Option<String>,

    /// Symbol file extension
    #[arg(long, value_name = "EXT", env = ENV_EXTENSION)]
    pub extension: Option<String>,
}

// ============================================
// Apply Subcommand
// ============================================

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// JSON file holding an array of description requests
    #[arg(short, long, value_name = "FILE")]
    pub requests: PathBuf,

    /// Merge in memory and print the result instead of writing the file
    #[arg(long)]
    pub dry_run: bool,
}

// ============================================
// Inspect Subcommand
// ============================================

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Maximum number of symbol entries to list (text output)
    #[arg(long, default_value = "50")]
    pub limit: usize,
}

// ============================================
// Key Subcommand
// ============================================

/// Arguments for the key command
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Element as JSON, e.g. '{"kind":"type","namespace":"App","name":"Foo"}'
    #[arg(value_name = "JSON")]
    pub element: String,

    /// Prefix method keys with their return type
    #[arg(long)]
    pub with_return: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// TOON
    Toon,
    /// JSON
    Json,
}
