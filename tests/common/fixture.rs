//! Temp-dir backed symbol file fixture
//!
//! Mirrors what a build leaves behind: an output directory holding
//! `<Assembly>.psym`, written by the external tool before annotation passes
//! flush their descriptions.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

use symweave::{Document, SymbolPaths, SymbolTable};

pub const ASSEMBLY: &str = "App";

/// Output directory with one symbol file
pub struct SymbolFixture {
    dir: TempDir,
}

impl SymbolFixture {
    /// Empty output directory, no symbol file yet
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Output directory holding an empty `<Symbols/>` document
    pub fn with_empty_document() -> Self {
        let fixture = Self::new();
        fixture.write_symbols("<Symbols/>");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> SymbolPaths {
        SymbolPaths::new(self.path(), ASSEMBLY)
    }

    pub fn symbol_file(&self) -> PathBuf {
        self.paths().symbol_file()
    }

    pub fn write_symbols(&self, xml: &str) -> &Self {
        fs::write(self.symbol_file(), xml).expect("Failed to write symbol file");
        self
    }

    pub fn read_symbols(&self) -> String {
        fs::read_to_string(self.symbol_file()).expect("Failed to read symbol file")
    }

    pub fn read_doc(&self) -> Document {
        Document::read(&self.symbol_file()).expect("Failed to parse symbol file")
    }

    pub fn table(&self) -> SymbolTable {
        SymbolTable::extract(&self.read_doc())
    }

    /// Config file the CLI is pointed at; absent until `write_config`
    pub fn config_file(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn write_config(&self, toml: &str) -> &Self {
        fs::write(self.config_file(), toml).expect("Failed to write config");
        self
    }

    /// Write a request file and return its path
    pub fn write_requests(&self, requests: &Value) -> PathBuf {
        let path = self.path().join("requests.json");
        fs::write(&path, serde_json::to_string_pretty(requests).unwrap())
            .expect("Failed to write request file");
        path
    }

    /// Run the symweave binary with a hermetic environment
    pub fn run_cli(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_symweave"))
            .current_dir(self.path())
            .env("SYMWEAVE_CONFIG", self.config_file())
            .env_remove("SYMWEAVE_OUTPUT_DIR")
            .env_remove("SYMWEAVE_ASSEMBLY_NAME")
            .env_remove("SYMWEAVE_EXTENSION")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to run symweave")
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args);
        assert!(
            output.status.success(),
            "symweave {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run CLI and expect failure, return (exit code, stderr)
    pub fn run_cli_failure(&self, args: &[&str]) -> (i32, String) {
        let output = self.run_cli(args);
        assert!(
            !output.status.success(),
            "symweave {:?} should have failed",
            args
        );
        (
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).to_string(),
        )
    }
}

impl Default for SymbolFixture {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request builders
// ============================================================================

pub fn type_json(namespace: &str, name: &str) -> Value {
    json!({ "namespace": namespace, "name": name })
}

pub fn producer() -> Value {
    type_json("App.Aspects", "TraceAspect")
}

pub fn type_request(name: &str, description: &str) -> Value {
    json!({
        "producer": producer(),
        "description": description,
        "target": { "kind": "type", "type": type_json("App", name) }
    })
}

pub fn method_request(type_name: &str, method: &str, description: &str) -> Value {
    json!({
        "producer": producer(),
        "description": description,
        "target": {
            "kind": "method",
            "method": { "declaring_type": type_json("App", type_name), "name": method }
        }
    })
}

pub fn field_request(type_name: &str, field: &str, description: &str) -> Value {
    json!({
        "producer": producer(),
        "description": description,
        "target": {
            "kind": "field",
            "field": { "declaring_type": type_json("App", type_name), "name": field }
        }
    })
}
