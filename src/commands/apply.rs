//! Apply command handler - Merge a request file into a symbol file

use std::fs;
use std::path::Path;

use crate::cli::{ApplyArgs, OutputFormat};
use crate::commands::CommandContext;
use crate::document::Document;
use crate::error::{Result, SymweaveError};
use crate::queue::{AnnotationQueue, AnnotationRequest, FlushReport, FlushStatus, MergeStats};

/// Run the apply command
pub fn run_apply(args: &ApplyArgs, ctx: &CommandContext) -> Result<String> {
    let symbols = args.location.symbol_file()?;
    let queue = load_requests(&args.requests)?;

    if ctx.verbose {
        eprintln!(
            "Loaded {} request(s) from {}",
            queue.len(),
            args.requests.display()
        );
    }

    if args.dry_run {
        return run_dry_run(&symbols, &queue, ctx);
    }

    let report = queue.flush(&symbols);
    Ok(format_report(&report, ctx))
}

/// Read a JSON array of requests into a queue
pub fn load_requests(path: &Path) -> Result<AnnotationQueue> {
    if !path.exists() {
        return Err(SymweaveError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    let requests: Vec<AnnotationRequest> =
        serde_json::from_str(&content).map_err(|e| SymweaveError::Request {
            message: format!("{}: {}", path.display(), e),
        })?;

    let mut queue = AnnotationQueue::new();
    for request in requests {
        queue.push(request);
    }
    Ok(queue)
}

/// Merge in memory and print the resulting document
fn run_dry_run(symbols: &Path, queue: &AnnotationQueue, ctx: &CommandContext) -> Result<String> {
    let mut doc = Document::read(symbols)?;
    let stats = queue.apply(&mut doc);
    let xml = doc.to_xml()?;

    let json_value = serde_json::json!({
        "_type": "apply_dry_run",
        "path": symbols.to_string_lossy(),
        "stats": stats,
        "document": xml,
    });

    let output = match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value).unwrap_or_default(),
        OutputFormat::Toon => super::encode_toon(&json_value),
        OutputFormat::Text => {
            let mut output = format!("{}\n", xml);
            output.push_str(&format!("# dry run: {}\n", symbols.display()));
            push_stats(&mut output, &stats);
            output
        }
    };
    Ok(output)
}

fn format_report(report: &FlushReport, ctx: &CommandContext) -> String {
    let json_value = serde_json::to_value(report).unwrap_or_default();
    match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value).unwrap_or_default(),
        OutputFormat::Toon => super::encode_toon(&json_value),
        OutputFormat::Text => {
            let mut output = String::new();
            if let Some(path) = &report.path {
                output.push_str(&format!("symbols: {}\n", path.display()));
            }
            match &report.status {
                FlushStatus::Empty => output.push_str("status: nothing queued\n"),
                FlushStatus::Saved => output.push_str("status: saved\n"),
                FlushStatus::Aborted { stage, reason } => {
                    output.push_str(&format!("status: aborted ({:?})\nreason: {}\n", stage, reason))
                }
                FlushStatus::Misconfigured { reason } => {
                    output.push_str(&format!("status: misconfigured\nreason: {}\n", reason))
                }
            }
            push_stats(&mut output, &report.stats);
            output
        }
    }
}

fn push_stats(output: &mut String, stats: &MergeStats) {
    output.push_str(&format!("merged: {}\n", stats.merged));
    output.push_str(&format!(
        "created: {} producer(s), {} scope(s), {} target(s), {} leaf/leaves\n",
        stats.created.producers, stats.created.scopes, stats.created.targets, stats.created.leaves
    ));
    if !stats.skipped.is_empty() {
        output.push_str(&format!("skipped: {}\n", stats.skipped.len()));
        for skipped in &stats.skipped {
            output.push_str(&format!(
                "  - #{} {}: {}\n",
                skipped.index, skipped.target, skipped.reason
            ));
        }
    }
}
