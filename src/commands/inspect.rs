//! Inspect command handler - Show what a symbol file contains

use crate::cli::{InspectArgs, OutputFormat};
use crate::commands::CommandContext;
use crate::document::Document;
use crate::error::Result;
use crate::symbols::SymbolTable;

/// Run the inspect command
pub fn run_inspect(args: &InspectArgs, ctx: &CommandContext) -> Result<String> {
    let path = args.location.symbol_file()?;
    let doc = Document::read(&path)?;
    let table = SymbolTable::extract(&doc);
    let counts = doc.counts();
    // None once the id space is used up
    let next_id = table.peek_next_id();

    let entries: Vec<serde_json::Value> = table
        .iter()
        .map(|(id, key)| serde_json::json!({ "id": id, "key": key }))
        .collect();

    let json_value = serde_json::json!({
        "_type": "symbol_file",
        "path": path.to_string_lossy(),
        "root": doc.root.name,
        "counts": counts,
        "symbols": table.len(),
        "next_id": next_id,
        "entries": entries,
    });

    let output = match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value).unwrap_or_default(),
        OutputFormat::Toon => super::encode_toon(&json_value),
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("═══════════════════════════════════════════════════════\n");
            output.push_str("  SYMBOL FILE\n");
            output.push_str("═══════════════════════════════════════════════════════\n\n");

            output.push_str(&format!("path: {}\n", path.display()));
            output.push_str(&format!("root: <{}>\n", doc.root.name));
            output.push_str(&format!("producers: {}\n", counts.producers));
            output.push_str(&format!("scopes: {}\n", counts.scopes));
            output.push_str(&format!("targets: {}\n", counts.targets));
            output.push_str(&format!("leaves: {}\n", counts.leaves));
            output.push_str(&format!("symbols: {}\n", table.len()));
            output.push_str(&format!(
                "next_id: {}\n",
                next_id.as_deref().unwrap_or("exhausted")
            ));

            if !table.is_empty() {
                output.push_str("\nentries:\n");
                for (id, key) in table.iter().take(args.limit) {
                    output.push_str(&format!("  #{} = {}\n", id, key));
                }
                if table.len() > args.limit {
                    output.push_str(&format!("  ... {} more\n", table.len() - args.limit));
                }
            }
            output
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LocationArgs;
    use std::fs;
    use tempfile::tempdir;

    fn args(path: std::path::PathBuf, limit: usize) -> InspectArgs {
        InspectArgs {
            location: LocationArgs {
                symbols: Some(path),
                ..LocationArgs::default()
            },
            limit,
        }
    }

    #[test]
    fn test_inspect_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("App.psym");
        fs::write(
            &path,
            r##"<Symbols><Class Class="#1=T:App.A"/><Class Class="#2=T:App.B"/></Symbols>"##,
        )
        .unwrap();

        let output = run_inspect(&args(path, 1), &CommandContext::default()).unwrap();

        assert!(output.contains("producers: 2"));
        assert!(output.contains("#1 = T:App.A"));
        assert!(!output.contains("#2 = T:App.B"));
        assert!(output.contains("... 1 more"));
        assert!(output.contains("next_id: 1000001"));
    }

    #[test]
    fn test_inspect_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("App.psym");
        fs::write(&path, r##"<Symbols><Class Class="#1000007=T:App.A"/></Symbols>"##).unwrap();

        let ctx = CommandContext::from_cli(OutputFormat::Json, false);
        let output = run_inspect(&args(path, 50), &ctx).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["next_id"], "1000008");
        assert_eq!(json["entries"][0]["key"], "T:App.A");
        assert_eq!(json["counts"]["producers"], 1);
    }

    #[test]
    fn test_inspect_exhausted_id_space() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("App.psym");
        fs::write(
            &path,
            r##"<Symbols><Class Class="#18446744073709551615=T:App.A"/></Symbols>"##,
        )
        .unwrap();

        let text = run_inspect(&args(path.clone(), 50), &CommandContext::default()).unwrap();
        assert!(text.contains("next_id: exhausted"));

        let ctx = CommandContext::from_cli(OutputFormat::Json, false);
        let json: serde_json::Value =
            serde_json::from_str(&run_inspect(&args(path, 50), &ctx).unwrap()).unwrap();
        assert!(json["next_id"].is_null());
    }

    #[test]
    fn test_inspect_missing_file_errors() {
        let dir = tempdir().unwrap();
        let result = run_inspect(&args(dir.path().join("absent.psym"), 50), &CommandContext::default());
        assert!(result.is_err());
    }
}
