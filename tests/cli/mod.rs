//! CLI command tests

mod apply_tests;
mod inspect_tests;
mod key_tests;
