//! Retrieval pipeline orchestration (§4.5): classify the query, fuse the
//! three candidate paths with class-dependent weights, apply the graph
//! neighborhood boost, rerank, then pack into the phase's token budget.
//!
//! This module is storage-agnostic — it takes already-fetched candidate
//! lists from each path (the storage layer owns running the FTS5 query, the
//! vector search, and the graph lookups) and owns only the fusion/boost/
//! rerank/pack arithmetic, so it can be unit tested without a database.

use crate::config::Phase;
use crate::graph::closure::ClosureEntry;
use crate::graph::GraphNode;
use crate::memory::Memory;

use super::boost::{apply_graph_boost, BoostCandidate};
use super::classify::{classify, QueryClass};
use super::hybrid::weighted_reciprocal_rank_fusion;
use super::packing::pack_context;

pub struct PipelineInput<'a> {
    pub query: &'a str,
    pub fts_results: Vec<(String, f32)>,
    pub dense_results: Vec<(String, f32)>,
    pub graph_results: Vec<(String, f32)>,
    pub rrf_k: f32,
}

#[derive(Debug, Clone)]
pub struct RankedMemory {
    pub memory_id: String,
    pub fused_score: f32,
}

/// Stage 1+2: classify the query and run weighted RRF fusion across the
/// three candidate paths. Returns ids ranked by fused score, most relevant
/// first.
pub fn classify_and_fuse(input: &PipelineInput<'_>) -> (QueryClass, Vec<RankedMemory>) {
    let class = classify(input.query);
    let weights = class.fusion_weights();
    let fused = weighted_reciprocal_rank_fusion(
        &[
            (&input.fts_results, weights.fts),
            (&input.dense_results, weights.dense),
            (&input.graph_results, weights.graph),
        ],
        input.rrf_k,
    );
    let ranked = fused
        .into_iter()
        .map(|(memory_id, fused_score)| RankedMemory { memory_id, fused_score })
        .collect();
    (class, ranked)
}

/// Stage 3: graph neighborhood boost. `memory_files` maps each ranked
/// memory's id to its primary related file, if any.
pub fn boost<'a>(
    ranked: &[RankedMemory],
    memory_files: impl Fn(&str) -> Option<&'a str>,
    nodes: &[GraphNode],
    closure: &[ClosureEntry],
) -> Vec<RankedMemory> {
    let candidates: Vec<BoostCandidate<'_>> = ranked
        .iter()
        .map(|r| BoostCandidate {
            memory_id: &r.memory_id,
            file_path: memory_files(&r.memory_id),
            fused_score: r.fused_score,
        })
        .collect();
    let boosted = apply_graph_boost(&candidates, nodes, closure);
    let mut results: Vec<RankedMemory> = boosted
        .into_iter()
        .map(|(memory_id, fused_score)| RankedMemory { memory_id, fused_score })
        .collect();
    results.sort_by(|a, b| b.fused_score.partial_cmp(&a.fused_score).unwrap_or(std::cmp::Ordering::Equal));
    results
}

/// Stage 5: pack the reranked, in-order memory list into the phase's token
/// budget. Reranking itself (cross-encoder, with passthrough fallback) runs
/// in [`super::reranker::Reranker`] against the fetched `Memory` rows; this
/// just does the final packing pass.
pub fn pack<'a>(ordered: &'a [Memory], phase: Phase, budget_tokens: usize) -> Vec<&'a Memory> {
    pack_context(ordered, phase, budget_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_query_weights_fts_heaviest() {
        let input = PipelineInput {
            query: "computeRetrievability",
            fts_results: vec![("m1".into(), 1.0)],
            dense_results: vec![("m2".into(), 1.0)],
            graph_results: vec![],
            rrf_k: 60.0,
        };
        let (class, ranked) = classify_and_fuse(&input);
        assert_eq!(class, QueryClass::Identifier);
        assert_eq!(ranked[0].memory_id, "m1");
    }

    #[test]
    fn structural_query_weights_graph_heaviest() {
        let input = PipelineInput {
            query: "who imports the config module",
            fts_results: vec![("m1".into(), 1.0)],
            dense_results: vec![],
            graph_results: vec![("m2".into(), 1.0)],
            rrf_k: 60.0,
        };
        let (class, ranked) = classify_and_fuse(&input);
        assert_eq!(class, QueryClass::Structural);
        assert_eq!(ranked[0].memory_id, "m2");
    }
}
