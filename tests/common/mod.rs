//! Common test utilities and fixtures for symweave integration tests
//!
//! This module provides:
//! - `SymbolFixture` for creating symbol files in a temp output directory
//! - Request builders for the JSON request files `apply` reads
//! - Assertions for CLI output and document shape

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod assertions;
pub mod fixture;

pub use assertions::*;
pub use fixture::SymbolFixture;
