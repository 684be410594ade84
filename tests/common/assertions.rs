//! Custom assertions for integration tests

use serde_json::Value;

use symweave::document::{Element, LEAF, LEAF_TEXT};
use symweave::{Document, SymbolTable};

/// Assert that output is valid JSON and return parsed value
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON ({}): {}\nOutput:\n{}",
            context, e, output
        )
    })
}

/// Assert that JSON output has expected type
pub fn assert_json_type(json: &Value, expected_type: &str) {
    let actual_type = json["_type"]
        .as_str()
        .unwrap_or_else(|| panic!("JSON missing '_type' field"));
    assert_eq!(
        actual_type, expected_type,
        "Expected JSON type '{}' but got '{}'",
        expected_type, actual_type
    );
}

/// All description leaves in document order
pub fn leaves(doc: &Document) -> Vec<&Element> {
    doc.root.descendants().filter(|e| e.is(LEAF)).collect()
}

/// Description texts of all leaves, resolved through the table
pub fn descriptions(doc: &Document) -> Vec<String> {
    let table = SymbolTable::extract(doc);
    leaves(doc)
        .into_iter()
        .filter_map(|leaf| leaf.attr(LEAF_TEXT))
        .filter_map(|raw| table.resolve_key(raw).map(str::to_string))
        .collect()
}

/// Assert that a description was merged somewhere in the document
pub fn assert_has_description(doc: &Document, text: &str) {
    let found = descriptions(doc);
    assert!(
        found.iter().any(|d| d == text),
        "Expected description {:?}, found {:?}",
        text,
        found
    );
}
