//! One-shot build session
//!
//! A `BuildSession` is created when the build starts, collects descriptions
//! from every annotation pass, and is finished exactly once when the build
//! ends. `finish` consumes the session, so a second flush cannot happen.
//!
//! The symbol file location is resolved when the session is created. If that
//! fails, the session still accepts requests, and `finish` reports the
//! configuration problem once for the whole build instead of once per
//! request.

use std::path::PathBuf;

use crate::config::SymbolPaths;
use crate::error::{Result, SymweaveError};
use crate::queue::{AnnotationQueue, AnnotationRequest, AnnotationTarget, FlushReport};
use crate::signature::TypeRef;

/// Queue plus symbol file location for one build
#[derive(Debug)]
pub struct BuildSession {
    paths: std::result::Result<SymbolPaths, SymweaveError>,
    queue: AnnotationQueue,
}

impl BuildSession {
    pub fn new(paths: Result<SymbolPaths>) -> Self {
        Self {
            paths,
            queue: AnnotationQueue::new(),
        }
    }

    /// Session whose paths come from the environment and config file
    pub fn from_env() -> Self {
        Self::new(SymbolPaths::from_env())
    }

    /// Queue a description; see [`AnnotationQueue::enqueue`]
    pub fn enqueue(
        &mut self,
        producer: TypeRef,
        description: impl Into<String>,
        target: AnnotationTarget,
    ) {
        self.queue.enqueue(producer, description, target);
    }

    pub fn push(&mut self, request: AnnotationRequest) {
        self.queue.push(request);
    }

    pub fn queue(&self) -> &AnnotationQueue {
        &self.queue
    }

    /// Symbol file this session will patch, if known
    pub fn symbol_file(&self) -> Option<PathBuf> {
        self.paths.as_ref().ok().map(SymbolPaths::symbol_file)
    }

    /// Flush all queued descriptions into the symbol file.
    pub fn finish(self) -> FlushReport {
        let Self { paths, queue } = self;
        match paths {
            Ok(paths) => queue.flush(&paths.symbol_file()),
            Err(e) => {
                tracing::error!(
                    "Cannot locate the symbol file, {} queued description(s) dropped: {}",
                    queue.len(),
                    e
                );
                FlushReport::misconfigured(e.to_string())
            }
        }
    }
}
