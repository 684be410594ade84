//! Malformed inputs, missing files and misconfiguration

use serde_json::json;

use crate::common::fixture::type_request;
use crate::common::*;
use symweave::{AbortStage, AnnotationQueue, AnnotationRequest, FlushStatus};

#[test]
fn test_malformed_symbol_file_is_not_rewritten() {
    let fixture = SymbolFixture::new();
    fixture.write_symbols("<Symbols><Class Class=\"#1=T:A\">");

    let mut queue = AnnotationQueue::new();
    let request: AnnotationRequest = serde_json::from_value(type_request("Foo", "x")).unwrap();
    queue.push(request);
    let report = queue.flush(&fixture.symbol_file());

    assert!(matches!(
        report.status,
        FlushStatus::Aborted {
            stage: AbortStage::Load,
            ..
        }
    ));
    assert_eq!(fixture.read_symbols(), "<Symbols><Class Class=\"#1=T:A\">");
}

#[test]
fn test_no_temp_files_left_behind() {
    let fixture = SymbolFixture::with_empty_document();

    let mut queue = AnnotationQueue::new();
    let request: AnnotationRequest = serde_json::from_value(type_request("Foo", "x")).unwrap();
    queue.push(request);
    assert!(queue.flush(&fixture.symbol_file()).is_saved());

    let names: Vec<String> = std::fs::read_dir(fixture.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["App.psym".to_string()]);
}

#[test]
fn test_apply_rejects_malformed_request_file() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!({ "not": "an array" }));
    let symbols = fixture.symbol_file();

    let (code, stderr) = fixture.run_cli_failure(&[
        "apply",
        symbols.to_str().unwrap(),
        "--requests",
        requests.to_str().unwrap(),
    ]);

    assert_eq!(code, 3);
    assert!(stderr.contains("requests.json"));
    assert_eq!(fixture.read_symbols(), "<Symbols/>");
}

#[test]
fn test_apply_without_location_is_config_error() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!([type_request("Foo", "x")]));

    let (code, stderr) =
        fixture.run_cli_failure(&["apply", "--requests", requests.to_str().unwrap()]);

    assert_eq!(code, 4);
    assert!(stderr.contains("SYMWEAVE_OUTPUT_DIR"));
}

#[test]
fn test_apply_with_malformed_config_file() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!([type_request("Foo", "x")]));
    fixture.write_config("[output\n");

    let (code, _stderr) =
        fixture.run_cli_failure(&["apply", "--requests", requests.to_str().unwrap()]);

    assert_eq!(code, 4);
}

#[test]
fn test_apply_resolves_location_from_config_file() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!([type_request("Foo", "configured")]));
    let dir = fixture.path().to_string_lossy().replace('\\', "/");
    fixture.write_config(&format!(
        "[output]\ndir = \"{}\"\nassembly_name = \"App\"\n",
        dir
    ));

    fixture.run_cli_success(&["apply", "--requests", requests.to_str().unwrap()]);

    assert_has_description(&fixture.read_doc(), "configured");
}
