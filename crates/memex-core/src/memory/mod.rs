//! Memory — the central entity of the engine (spec §3.1).
//!
//! A `Memory` is an immutable-by-convention record of one unit of learned
//! knowledge. It is mutated only by retrieval hits (access bookkeeping),
//! user correction/verification, decay/pruning, or re-embedding.

mod kind;

pub use kind::MemoryKind;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a memory's embedding / confidence scope stops applying.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryScope {
    #[default]
    Global,
    Module,
    WorkUnit,
    Session,
}

/// Who (or what) produced a memory; determines a trust multiplier in ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    AgentExplicit,
    ObserverInferred,
    QaAuto,
    McpAuto,
    CommitAuto,
    UserTaught,
}

impl MemorySource {
    /// Trust multiplier applied during ranking; hand-taught and explicit
    /// memories outrank ones inferred from behavioral signals.
    pub fn trust_multiplier(self) -> f64 {
        match self {
            MemorySource::UserTaught => 1.0,
            MemorySource::AgentExplicit => 0.95,
            MemorySource::CommitAuto => 0.85,
            MemorySource::QaAuto => 0.8,
            MemorySource::McpAuto => 0.75,
            MemorySource::ObserverInferred => 0.7,
        }
    }
}

/// Kind-specific structured payload for memories derived from source code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Function,
    Class,
    Module,
    Prose,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChunkMetadata {
    pub chunk_kind: Option<ChunkKind>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    /// Header text prepended before the payload when embedding (see
    /// `embeddings::contextualize`).
    pub context_prefix: Option<String>,
    pub embedding_model_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LifecycleFlags {
    pub needs_review: bool,
    pub user_verified: bool,
    pub pinned: bool,
    pub deprecated: bool,
    pub stale_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphLink {
    pub target_node_id: Option<String>,
    pub impacted_node_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Provenance {
    pub session_id: String,
    pub commit_hash: Option<String>,
    pub reinforced_by_sessions: Vec<String>,
}

/// The central knowledge record (spec §3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub project_id: String,
    pub kind: MemoryKind,
    pub content: String,
    /// Confidence in `[0, 1]` — invariant I3.
    pub confidence: f64,
    pub tags: Vec<String>,
    /// First entry is the primary related file.
    pub related_files: Vec<String>,
    pub related_modules: Vec<String>,
    pub scope: MemoryScope,
    pub source: MemorySource,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub provenance: Provenance,
    pub graph_link: GraphLink,
    pub lifecycle: LifecycleFlags,
    pub chunk: Option<ChunkMetadata>,
    /// Embedding model id this memory's stored vector (if any) was produced
    /// with. Never compared across model ids (invariant I5).
    pub embedding_model_id: Option<String>,
}

impl Memory {
    /// Build a new memory with a fresh id and `created_at`/`last_accessed_at`
    /// pinned to the same instant, per invariant I3.
    pub fn new(project_id: impl Into<String>, kind: MemoryKind, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            kind,
            content: content.into(),
            confidence: 0.5,
            tags: Vec::new(),
            related_files: Vec::new(),
            related_modules: Vec::new(),
            scope: MemoryScope::default(),
            source: MemorySource::AgentExplicit,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            provenance: Provenance::default(),
            graph_link: GraphLink::default(),
            lifecycle: LifecycleFlags::default(),
            chunk: None,
            embedding_model_id: None,
        }
    }

    /// Primary related file, if any (first entry in `related_files`).
    pub fn primary_file(&self) -> Option<&str> {
        self.related_files.first().map(|s| s.as_str())
    }

    /// Visible to retrieval unless deprecated (invariant I4).
    pub fn is_retrievable(&self) -> bool {
        !self.lifecycle.deprecated
    }

    /// Record a retrieval hit: bump `last_accessed_at` and `access_count`.
    pub fn record_access(&mut self) {
        self.last_accessed_at = Utc::now();
        self.access_count += 1;
    }

    /// Clamp confidence into `[0, 1]`, enforcing invariant I3 after any
    /// arithmetic adjustment (trust gate, scoring, decay).
    pub fn clamp_confidence(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}
