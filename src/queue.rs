//! Annotation queue and flush
//!
//! Annotation passes enqueue "attach this description to that element"
//! requests while the symbol file may not exist yet. Nothing is resolved at
//! enqueue time. When the build finishes the queue is flushed once:
//!
//! 1. load the symbol file (absent or malformed: abort, write nothing)
//! 2. extract the symbol table
//! 3. merge every request independently (a failing request is skipped)
//! 4. save the document once
//!
//! Flushing never returns an error. The [`FlushReport`] says what happened.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{Document, NodeCounts};
use crate::error::Result;
use crate::merge::{MergeOutcome, Merger};
use crate::signature::{FieldRef, MethodRef, PropertyRef, TypeRef};
use crate::symbols::SymbolTable;

/// The element a description is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationTarget {
    Method {
        method: MethodRef,
    },
    Type {
        #[serde(rename = "type")]
        ty: TypeRef,
    },
    Property {
        property: PropertyRef,
    },
    PropertyAccessor {
        property: PropertyRef,
        accessor: MethodRef,
    },
    Field {
        field: FieldRef,
    },
}

impl AnnotationTarget {
    /// Canonical key of the annotated element
    pub fn key(&self) -> Result<String> {
        match self {
            Self::Method { method } => method.key(),
            Self::Type { ty } => ty.key(),
            Self::Property { property } => property.key(),
            Self::PropertyAccessor { accessor, .. } => accessor.key(),
            Self::Field { field } => field.key(),
        }
    }

    /// Short label for logs and reports; falls back to the raw name when
    /// the key cannot be rendered
    pub fn label(&self) -> String {
        self.key().unwrap_or_else(|_| match self {
            Self::Method { method } => method.name.clone(),
            Self::Type { ty } => ty.name.clone(),
            Self::Property { property } => property.name.clone(),
            Self::PropertyAccessor { accessor, .. } => accessor.name.clone(),
            Self::Field { field } => field.name.clone(),
        })
    }
}

/// One queued description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRequest {
    /// Type of the annotation-producing unit
    pub producer: TypeRef,
    pub description: String,
    pub target: AnnotationTarget,
}

impl AnnotationRequest {
    /// Merge this request through `merger`
    pub fn merge_into(&self, merger: &mut Merger<'_>) -> Result<MergeOutcome> {
        let producer = &self.producer;
        let description = self.description.as_str();
        match &self.target {
            AnnotationTarget::Method { method } => merger.merge_method(producer, method, description),
            AnnotationTarget::Type { ty } => merger.merge_type(producer, ty, description),
            AnnotationTarget::Property { property } => {
                merger.merge_property(producer, property, description)
            }
            AnnotationTarget::PropertyAccessor { property, accessor } => {
                merger.merge_property_accessor(producer, property, accessor, description)
            }
            AnnotationTarget::Field { field } => merger.merge_field(producer, field, description),
        }
    }
}

/// A request that contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRequest {
    /// Position in the queue
    pub index: usize,
    pub target: String,
    pub reason: String,
}

/// Result of merging a queue into one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub merged: usize,
    /// Nodes created across all merged requests
    pub created: NodeCounts,
    pub skipped: Vec<SkippedRequest>,
}

impl MergeStats {
    fn record(&mut self, outcome: &MergeOutcome) {
        self.merged += 1;
        self.created.producers += outcome.created_producer as usize;
        self.created.scopes += outcome.created_scope as usize;
        self.created.targets += outcome.created_target as usize;
        self.created.leaves += 1;
    }
}

/// Stage at which a flush gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AbortStage {
    Load,
    Save,
}

/// Overall flush status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FlushStatus {
    /// Nothing was queued; the file system was not touched
    Empty,
    /// The document was merged and written
    Saved,
    /// Nothing was written
    Aborted { stage: AbortStage, reason: String },
    /// The symbol file location could not be determined
    Misconfigured { reason: String },
}

/// What a flush did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub status: FlushStatus,
    pub stats: MergeStats,
}

impl FlushReport {
    fn new(path: Option<&Path>, status: FlushStatus, stats: MergeStats) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            status,
            stats,
        }
    }

    pub(crate) fn misconfigured(reason: String) -> Self {
        Self::new(None, FlushStatus::Misconfigured { reason }, MergeStats::default())
    }

    /// Whether the document was written
    pub fn is_saved(&self) -> bool {
        self.status == FlushStatus::Saved
    }
}

/// Pending requests for one build
#[derive(Debug, Clone, Default)]
pub struct AnnotationQueue {
    requests: Vec<AnnotationRequest>,
}

impl AnnotationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a description for `target`, produced by `producer`
    pub fn enqueue(
        &mut self,
        producer: TypeRef,
        description: impl Into<String>,
        target: AnnotationTarget,
    ) {
        self.push(AnnotationRequest {
            producer,
            description: description.into(),
            target,
        });
    }

    pub fn push(&mut self, request: AnnotationRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[AnnotationRequest] {
        &self.requests
    }

    /// Merge every request into an already loaded document.
    ///
    /// The symbol table is extracted once and shared, so ids generated by
    /// one request are visible to the next.
    pub fn apply(&self, doc: &mut Document) -> MergeStats {
        let mut table = SymbolTable::extract(doc);
        let mut merger = Merger::new(&mut doc.root, &mut table);
        let mut stats = MergeStats::default();

        for (index, request) in self.requests.iter().enumerate() {
            match request.merge_into(&mut merger) {
                Ok(outcome) => {
                    tracing::debug!(
                        "Merged description for {} ({:?})",
                        request.target.label(),
                        outcome.scope_match
                    );
                    stats.record(&outcome);
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping description for {}: {}",
                        request.target.label(),
                        e
                    );
                    stats.skipped.push(SkippedRequest {
                        index,
                        target: request.target.label(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        stats
    }

    /// Load, merge and save the symbol file at `path`.
    ///
    /// An empty queue returns immediately without touching `path`. A missing
    /// or malformed file aborts before anything is written; a new file is
    /// never created.
    pub fn flush(self, path: &Path) -> FlushReport {
        self.flush_with(path, |doc| doc.save(path))
    }

    /// `flush` with the final write supplied by the caller
    fn flush_with<F>(self, path: &Path, save: F) -> FlushReport
    where
        F: FnOnce(&Document) -> Result<()>,
    {
        if self.is_empty() {
            tracing::debug!("No queued descriptions, skipping {}", path.display());
            return FlushReport::new(Some(path), FlushStatus::Empty, MergeStats::default());
        }

        let mut doc = match Document::read(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!("Not merging into {}: {}", path.display(), e);
                return FlushReport::new(
                    Some(path),
                    FlushStatus::Aborted {
                        stage: AbortStage::Load,
                        reason: e.to_string(),
                    },
                    MergeStats::default(),
                );
            }
        };

        let stats = self.apply(&mut doc);

        if let Err(e) = save(&doc) {
            tracing::warn!("Failed to write {}: {}", path.display(), e);
            return FlushReport::new(
                Some(path),
                FlushStatus::Aborted {
                    stage: AbortStage::Save,
                    reason: e.to_string(),
                },
                stats,
            );
        }

        tracing::info!(
            "Merged {} of {} descriptions into {}",
            stats.merged,
            self.requests.len(),
            path.display()
        );
        FlushReport::new(Some(path), FlushStatus::Saved, stats)
    }
}
