//! Key command handler - Render the canonical key of an element

use crate::cli::{KeyArgs, OutputFormat};
use crate::commands::CommandContext;
use crate::error::{Result, SymweaveError};
use crate::signature::ElementRef;

/// Run the key command
pub fn run_key(args: &KeyArgs, ctx: &CommandContext) -> Result<String> {
    let element: ElementRef =
        serde_json::from_str(&args.element).map_err(|e| SymweaveError::Request {
            message: format!("element JSON: {}", e),
        })?;

    let key = match (&element, args.with_return) {
        (ElementRef::Method(method), true) => method.key_with_return()?,
        _ => element.key()?,
    };

    let json_value = serde_json::json!({ "_type": "key", "key": key });

    let output = match ctx.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value).unwrap_or_default(),
        OutputFormat::Toon => super::encode_toon(&json_value),
        OutputFormat::Text => format!("{}\n", key),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_args(element: &str, with_return: bool) -> KeyArgs {
        KeyArgs {
            element: element.to_string(),
            with_return,
        }
    }

    #[test]
    fn test_type_key() {
        let output = run_key(
            &key_args(r#"{"kind":"type","namespace":"App","name":"Foo"}"#, false),
            &CommandContext::default(),
        )
        .unwrap();
        assert_eq!(output, "T:App.Foo\n");
    }

    #[test]
    fn test_method_key_with_return() {
        let json = r#"{
            "kind": "method",
            "declaring_type": {"namespace": "App", "name": "Foo"},
            "name": "get_Count",
            "return_type": {"namespace": "System", "name": "Int32"}
        }"#;
        let output = run_key(&key_args(json, true), &CommandContext::default()).unwrap();
        assert_eq!(output, "M:System.Int32 App.Foo::get_Count()\n");
    }

    #[test]
    fn test_invalid_json() {
        let result = run_key(&key_args("nope", false), &CommandContext::default());
        assert!(matches!(result, Err(SymweaveError::Request { .. })));
    }
}
