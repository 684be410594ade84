//! symweave: merge descriptions into compiled-symbol documents
//!
//! An external tool writes a symbol document (XML) next to every compiled
//! assembly. Annotation passes running during the build want to attach
//! human-readable descriptions to types, methods, properties and fields in
//! that document. This crate queues those requests and merges them in a
//! single load/merge/save pass when the build ends.
//!
//! # Example
//!
//! ```ignore
//! use symweave::{AnnotationQueue, AnnotationTarget, MethodRef, TypeRef};
//! use std::path::Path;
//!
//! let producer = TypeRef::new("App.Aspects", "Trace");
//! let foo = TypeRef::new("App", "Foo");
//!
//! let mut queue = AnnotationQueue::new();
//! queue.enqueue(
//!     producer,
//!     "Traced on entry and exit",
//!     AnnotationTarget::Method { method: MethodRef::new(foo, "Run") },
//! );
//!
//! let report = queue.flush(Path::new("bin/App.psym"));
//! println!("{:?}", report.status);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod fs_utils;
pub mod merge;
pub mod queue;
pub mod session;
pub mod signature;
pub mod symbols;

pub use cli::{Cli, OutputFormat};
pub use config::{SymbolPaths, SymweaveConfig};
pub use document::{Document, Element, Node, NodeCounts};
pub use error::{Result, SymweaveError};
pub use merge::{MergeOutcome, Merger, ScopeMatch};
pub use queue::{
    AbortStage, AnnotationQueue, AnnotationRequest, AnnotationTarget, FlushReport, FlushStatus,
    MergeStats, SkippedRequest,
};
pub use session::BuildSession;
pub use signature::{AccessorKind, ElementRef, FieldRef, MethodRef, PropertyRef, TypeRef};
pub use symbols::{SymbolTable, ID_FLOOR};
