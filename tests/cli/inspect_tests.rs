//! Tests for `symweave inspect`

use crate::common::*;

const TOOL_OUTPUT: &str = r##"<Symbols>
  <Class Class="#1=T:App.Aspects.TraceAspect">
    <Instance Declaration="#2=T:App.Foo">
      <Target Target="#3=M:App.Foo::Run()">
        <Annotation Description="#4=hello" Source="#1"/>
      </Target>
    </Instance>
  </Class>
</Symbols>"##;

#[test]
fn test_inspect_text() {
    let fixture = SymbolFixture::new();
    fixture.write_symbols(TOOL_OUTPUT);
    let symbols = fixture.symbol_file();

    let stdout = fixture.run_cli_success(&["inspect", symbols.to_str().unwrap()]);

    assert!(stdout.contains("producers: 1"));
    assert!(stdout.contains("leaves: 1"));
    assert!(stdout.contains("#3 = M:App.Foo::Run()"));
    assert!(stdout.contains("next_id: 1000001"));
}

#[test]
fn test_inspect_json() {
    let fixture = SymbolFixture::new();
    fixture.write_symbols(TOOL_OUTPUT);
    let symbols = fixture.symbol_file();

    let stdout = fixture.run_cli_success(&["--format", "json", "inspect", symbols.to_str().unwrap()]);

    let json = assert_valid_json(&stdout, "inspect --format json");
    assert_json_type(&json, "symbol_file");
    assert_eq!(json["symbols"], 4);
    assert_eq!(json["counts"]["targets"], 1);
    assert_eq!(json["entries"][1]["id"], "2");
    assert_eq!(json["entries"][1]["key"], "T:App.Foo");
}

#[test]
fn test_inspect_missing_file_fails() {
    let fixture = SymbolFixture::new();
    let symbols = fixture.symbol_file();

    let (code, stderr) = fixture.run_cli_failure(&["inspect", symbols.to_str().unwrap()]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Error:"));
}
