//! Tests for `symweave apply`

use serde_json::json;

use crate::common::fixture::{field_request, method_request, type_request, ASSEMBLY};
use crate::common::*;

#[test]
fn test_apply_merges_request_file() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!([
        type_request("Foo", "traced type"),
        method_request("Foo", "Run", "traced method"),
    ]));
    let symbols = fixture.symbol_file();

    let stdout = fixture.run_cli_success(&[
        "apply",
        symbols.to_str().unwrap(),
        "--requests",
        requests.to_str().unwrap(),
    ]);

    assert!(stdout.contains("status: saved"));
    assert!(stdout.contains("merged: 2"));
    let doc = fixture.read_doc();
    assert_has_description(&doc, "traced type");
    assert_has_description(&doc, "traced method");
}

#[test]
fn test_apply_resolves_path_from_location_flags() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!([type_request("Foo", "located")]));
    let output_dir = fixture.path().to_str().unwrap().to_string();

    fixture.run_cli_success(&[
        "apply",
        "--output-dir",
        &output_dir,
        "--assembly-name",
        ASSEMBLY,
        "--requests",
        requests.to_str().unwrap(),
    ]);

    assert_has_description(&fixture.read_doc(), "located");
}

#[test]
fn test_apply_json_report() {
    let fixture = SymbolFixture::with_empty_document();
    let requests = fixture.write_requests(&json!([
        type_request("Foo", "ok"),
        field_request("Foo", "", "rejected"),
    ]));
    let symbols = fixture.symbol_file();

    let stdout = fixture.run_cli_success(&[
        "--format",
        "json",
        "apply",
        symbols.to_str().unwrap(),
        "-r",
        requests.to_str().unwrap(),
    ]);

    let json = assert_valid_json(&stdout, "apply --format json");
    assert_eq!(json["status"], "saved");
    assert_eq!(json["stats"]["merged"], 1);
    assert_eq!(json["stats"]["skipped"][0]["index"], 1);
    assert_eq!(json["stats"]["created"]["producers"], 1);
}

#[test]
fn test_apply_dry_run_leaves_file_untouched() {
    let fixture = SymbolFixture::with_empty_document();
    let before = fixture.read_symbols();
    let requests = fixture.write_requests(&json!([type_request("Foo", "preview")]));
    let symbols = fixture.symbol_file();

    let stdout = fixture.run_cli_success(&[
        "--format",
        "json",
        "apply",
        symbols.to_str().unwrap(),
        "--requests",
        requests.to_str().unwrap(),
        "--dry-run",
    ]);

    let json = assert_valid_json(&stdout, "apply --dry-run");
    assert_json_type(&json, "apply_dry_run");
    assert!(json["document"]
        .as_str()
        .unwrap()
        .contains(r##"Description="#1000003=preview""##));
    assert_eq!(fixture.read_symbols(), before);
}

#[test]
fn test_apply_to_missing_file_reports_abort() {
    let fixture = SymbolFixture::new();
    let requests = fixture.write_requests(&json!([type_request("Foo", "nowhere")]));
    let symbols = fixture.symbol_file();

    let stdout = fixture.run_cli_success(&[
        "apply",
        symbols.to_str().unwrap(),
        "--requests",
        requests.to_str().unwrap(),
    ]);

    assert!(stdout.contains("status: aborted"));
    assert!(!symbols.exists());
}
