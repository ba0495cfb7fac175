//! Retrieval Pipeline (spec §4.5)
//!
//! - [`classify`] picks a query's class (identifier / semantic / structural).
//! - [`keyword`] runs the FTS5 candidate path.
//! - [`vector`] runs the HNSW dense candidate path.
//! - [`hybrid`] fuses candidate paths with (weighted) reciprocal rank fusion.
//! - [`boost`] applies the graph neighborhood boost to fused results.
//! - [`reranker`] runs the cross-encoder rerank pass, with a passthrough fallback.
//! - [`packing`] fits the reranked list into a phase's token budget.
//! - [`pipeline`] orchestrates the above end to end.

pub mod boost;
pub mod classify;
mod hybrid;
mod keyword;
pub mod packing;
pub mod pipeline;
mod reranker;
mod vector;

pub use vector::{
    VectorIndex, VectorIndexConfig, VectorIndexStats, VectorSearchError, DEFAULT_CONNECTIVITY,
    DEFAULT_DIMENSIONS,
};

pub use keyword::{sanitize_fts5_query, KeywordHit, KeywordSearcher};

pub use hybrid::{
    linear_combination, reciprocal_rank_fusion, weighted_reciprocal_rank_fusion,
    HybridSearchConfig, HybridSearcher,
};

pub use reranker::{
    Reranker, RerankerConfig, RerankerError, RerankedResult, DEFAULT_RERANK_COUNT,
    DEFAULT_RETRIEVAL_COUNT,
};

pub use classify::{classify, FusionWeights, QueryClass};
pub use boost::{apply_graph_boost, BoostCandidate, BOOST_WEIGHT, GRAPH_BOOST_TOPK};
pub use packing::{estimate_tokens, pack_context};
pub use pipeline::{boost as pipeline_boost, classify_and_fuse, pack as pipeline_pack, PipelineInput, RankedMemory};
