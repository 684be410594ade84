//! Edge cases and error handling tests

mod error_handling_tests;
