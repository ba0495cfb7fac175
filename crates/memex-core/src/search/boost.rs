//! Graph neighborhood boost (§4.5.4): candidates whose related file sits
//! next to the files the top-ranked results already live in get a small
//! relevance bump — the idea a result is more likely right if it is
//! structurally close to what already looks right.

use std::collections::{HashMap, HashSet};

use crate::graph::closure::ClosureEntry;
use crate::graph::GraphNode;

/// Re-rank seed count: only the top-K fused results seed the neighborhood.
pub const GRAPH_BOOST_TOPK: usize = 10;
/// Weight applied to the neighbor-density bonus.
pub const BOOST_WEIGHT: f32 = 0.3;

/// One candidate's fused score plus the file it's attached to, as input to
/// the boost pass.
pub struct BoostCandidate<'a> {
    pub memory_id: &'a str,
    pub file_path: Option<&'a str>,
    pub fused_score: f32,
}

/// Apply the neighborhood boost in place, returning `(memory_id, boosted_score)`
/// pairs in the same order as `candidates`.
///
/// `nodes` and `closure` are used to map each of the top-K seed files to
/// their depth-1 closure neighbors' file paths.
pub fn apply_graph_boost(
    candidates: &[BoostCandidate<'_>],
    nodes: &[GraphNode],
    closure: &[ClosureEntry],
) -> Vec<(String, f32)> {
    let seed_files: HashSet<&str> = candidates
        .iter()
        .take(GRAPH_BOOST_TOPK)
        .filter_map(|c| c.file_path)
        .collect();
    let top_file_count = seed_files.len().max(1);

    let node_by_id: HashMap<&str, &GraphNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    // For every seed file's nodes, find their depth-1 closure neighbors and
    // tally how many distinct seed files reach each neighbor file.
    let mut neighbor_file_counts: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        let Some(file) = node.file_path.as_deref() else { continue };
        if !seed_files.contains(file) {
            continue;
        }
        for entry in closure.iter().filter(|e| e.from_id == node.id && e.depth == 1) {
            if let Some(neighbor) = node_by_id.get(entry.to_id.as_str()) {
                if let Some(neighbor_file) = neighbor.file_path.as_deref() {
                    if !seed_files.contains(neighbor_file) {
                        *neighbor_file_counts.entry(neighbor_file).or_insert(0) += 1;
                    }
                }
            }
        }
    }

    candidates
        .iter()
        .map(|c| {
            let bonus = c
                .file_path
                .and_then(|f| neighbor_file_counts.get(f))
                .map(|&count| BOOST_WEIGHT * (count as f32 / top_file_count as f32))
                .unwrap_or(0.0);
            (c.memory_id.to_string(), c.fused_score + bonus)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::closure::rebuild_closure;
    use crate::graph::{EdgeType, GraphEdge, NodeKind};

    #[test]
    fn neighbor_of_seed_file_gets_boosted() {
        let seed = GraphNode::new("p", "a.ts", "a.ts", NodeKind::File);
        let neighbor = GraphNode::new("p", "b.ts", "b.ts", NodeKind::File);
        let edge = GraphEdge::new("p", &seed.id, &neighbor.id, EdgeType::Imports);
        let closure = rebuild_closure(&[edge], 5);
        let nodes = vec![seed, neighbor];

        let candidates = vec![
            BoostCandidate { memory_id: "m1", file_path: Some("a.ts"), fused_score: 1.0 },
            BoostCandidate { memory_id: "m2", file_path: Some("b.ts"), fused_score: 1.0 },
            BoostCandidate { memory_id: "m3", file_path: Some("c.ts"), fused_score: 1.0 },
        ];
        let boosted = apply_graph_boost(&candidates, &nodes, &closure);
        let m2_score = boosted.iter().find(|(id, _)| id == "m2").unwrap().1;
        let m3_score = boosted.iter().find(|(id, _)| id == "m3").unwrap().1;
        assert!(m2_score > 1.0);
        assert_eq!(m3_score, 1.0);
    }
}
