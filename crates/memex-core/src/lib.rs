//! # memex-core
//!
//! Durable, cross-session memory engine for coding agents. Six components:
//!
//! - **Store** (§4.1): SQLite-backed persistence for memories and the
//!   knowledge graph, with FTS5 full-text search.
//! - **Embedding Provider** (§4.2): local fastembed inference
//!   (nomic-embed-text-v1.5, Matryoshka-truncated to 256 dimensions), with a
//!   content-addressed cache.
//! - **Knowledge Graph Indexer** (§4.3): syntactic extraction, a
//!   pre-computed transitive-closure table, and impact analysis.
//! - **Observer / Scratchpad** (§4.4): zero-I/O live session analytics that
//!   feed a five-stage promotion pipeline gated by a trust check.
//! - **Retrieval Pipeline** (§4.5): query classification, weighted
//!   reciprocal rank fusion, graph-neighborhood boosting, cross-encoder
//!   rerank, and phase-aware context packing.
//! - **Agent Injection Bridge** (§4.6): decides what, if anything, gets
//!   pushed into an agent's context at a given step.
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local embedding generation with fastembed
//! - `vector-search` (default): HNSW vector search with USearch
//! - `bundled-sqlite` (default): statically linked SQLite
//! - `encryption`: SQLCipher-backed encrypted storage (mutually exclusive
//!   with `bundled-sqlite`)
//! - `full`: all of the above

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod injection;
pub mod memory;
pub mod observer;
pub mod storage;

#[cfg(feature = "embeddings")]
#[cfg_attr(docsrs, doc(cfg(feature = "embeddings")))]
pub mod embeddings;

#[cfg(feature = "vector-search")]
#[cfg_attr(docsrs, doc(cfg(feature = "vector-search")))]
pub mod search;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::{Config, Phase, SessionType};
pub use error::{scrub_secrets, EngineError, Result};
pub use fingerprint::{fingerprint, normalize};

pub use memory::{
    ChunkKind, ChunkMetadata, GraphLink, LifecycleFlags, Memory, MemoryKind, MemoryScope,
    MemorySource, Provenance,
};

pub use graph::{
    closure::{get_ancestors, get_descendants, rebuild_closure, update_closure_for_node, ClosureEntry},
    impact::{impact, ImpactResult},
    indexer::{extract_file, ExtractionResult},
    EdgeType, GraphEdge, GraphNode, Layer, NodeConfidence, NodeKind, NodeSource,
};

pub use observer::{
    apply_trust_gate, finalize_candidates, promote, Candidate, Scratchpad, Signal, SignalKind,
    TrustGateOutcome,
};

pub use injection::{Injection, InjectionBridge, InjectionTrigger, WARMUP_STEPS};

pub use storage::Storage;

#[cfg(feature = "embeddings")]
pub use embeddings::{
    contextualize, cosine_similarity, euclidean_distance, Embedding, EmbeddingCache,
    EmbeddingError, EmbeddingService, EMBEDDING_DIMENSIONS,
};

#[cfg(feature = "vector-search")]
pub use search::{
    apply_graph_boost, classify, linear_combination, pack_context, reciprocal_rank_fusion,
    weighted_reciprocal_rank_fusion, BoostCandidate, FusionWeights, HybridSearchConfig,
    HybridSearcher, KeywordSearcher, QueryClass, Reranker, RerankerConfig, RerankerError,
    RerankedResult, VectorIndex, VectorIndexConfig, VectorIndexStats, VectorSearchError,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model (nomic-embed-text-v1.5, 8192 token context,
/// Matryoshka support).
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-ai/nomic-embed-text-v1.5";

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::{Config, EngineError, Memory, MemoryKind, Result, Storage};

    #[cfg(feature = "embeddings")]
    pub use crate::{Embedding, EmbeddingService};

    #[cfg(feature = "vector-search")]
    pub use crate::{HybridSearcher, Reranker, VectorIndex};

    pub use crate::{Candidate, InjectionBridge, Scratchpad, Signal};
    pub use crate::{GraphEdge, GraphNode, ImpactResult};
}
