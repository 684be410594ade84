//! Tests for `symweave key`

use crate::common::*;

#[test]
fn test_key_for_nested_generic_type() {
    let fixture = SymbolFixture::new();
    let element = r#"{
        "kind": "type",
        "name": "Inner",
        "declaring_type": {"namespace": "App", "name": "Outer`1"},
        "generic_args": [{"namespace": "System", "name": "String"}]
    }"#;

    let stdout = fixture.run_cli_success(&["key", element]);

    assert_eq!(stdout.trim(), "T:App.Outer+Inner{System.String}");
}

#[test]
fn test_key_for_constructor() {
    let fixture = SymbolFixture::new();
    let element = r#"{
        "kind": "method",
        "declaring_type": {"namespace": "App", "name": "Foo"},
        "name": ".ctor",
        "parameters": [{"namespace": "System", "name": "Int32"}]
    }"#;

    let stdout = fixture.run_cli_success(&["--format", "json", "key", element]);

    let json = assert_valid_json(&stdout, "key --format json");
    assert_json_type(&json, "key");
    assert_eq!(json["key"], "M:App.Foo::#ctor(System.Int32)");
}

#[test]
fn test_key_rejects_blank_name() {
    let fixture = SymbolFixture::new();

    let (code, stderr) =
        fixture.run_cli_failure(&["key", r#"{"kind":"field","declaring_type":{"name":"Foo"},"name":""}"#]);

    assert_eq!(code, 3);
    assert!(stderr.contains("invalid"));
}
