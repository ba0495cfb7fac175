//! Transitive closure over the knowledge graph (spec §4.3.1).
//!
//! The closure table trades write-time cost for O(1) "what does X reach"
//! reads. Computation here is pure — it takes an edge set and returns closure
//! rows; persisting those rows (batched in chunks of 500) is the storage
//! layer's job.

use std::collections::{HashMap, HashSet, VecDeque};

use super::GraphEdge;

/// Maximum BFS depth a closure entry may record (§4.3.1).
pub const MAX_DEPTH: u32 = 5;

/// One row of the closure table: `from_id` can reach `to_id` in `depth` hops
/// along the recorded `path_edge_id` (the edge used on the shortest path,
/// lexicographically smallest edge id breaking ties).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClosureEntry {
    pub from_id: String,
    pub to_id: String,
    pub depth: u32,
    pub path_edge_id: String,
}

/// Build an adjacency map from `from_id` to its outgoing `(to_id, edge_id)`
/// pairs, skipping stale edges.
fn adjacency(edges: &[GraphEdge]) -> HashMap<&str, Vec<(&str, &str)>> {
    let mut map: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
    for edge in edges {
        if edge.is_stale() {
            continue;
        }
        map.entry(edge.from_id.as_str())
            .or_default()
            .push((edge.to_id.as_str(), edge.id.as_str()));
    }
    for neighbors in map.values_mut() {
        neighbors.sort_by(|a, b| a.1.cmp(b.1));
    }
    map
}

/// BFS from `root` out to `max_depth`, recording the shortest-path edge id
/// used to reach each descendant (tie-broken by lexicographically smallest
/// edge id, via the sorted adjacency lists above). Self-loops and cycles are
/// broken by the `visited` set — a node already on the frontier is never
/// re-enqueued.
pub fn closure_for_node(edges: &[GraphEdge], root: &str, max_depth: u32) -> Vec<ClosureEntry> {
    let adj = adjacency(edges);
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(root);
    let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
    queue.push_back((root, 0));
    let mut entries = Vec::new();

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let Some(neighbors) = adj.get(node) else {
            continue;
        };
        for &(to_id, edge_id) in neighbors {
            if visited.contains(to_id) {
                continue;
            }
            visited.insert(to_id);
            entries.push(ClosureEntry {
                from_id: root.to_string(),
                to_id: to_id.to_string(),
                depth: depth + 1,
                path_edge_id: edge_id.to_string(),
            });
            queue.push_back((to_id, depth + 1));
        }
    }

    entries
}

/// Full closure rebuild: every node that appears as an edge endpoint gets its
/// own closure entries computed independently (§4.3.1 "full rebuild").
pub fn rebuild_closure(edges: &[GraphEdge], max_depth: u32) -> Vec<ClosureEntry> {
    let mut roots: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for edge in edges {
        if seen.insert(edge.from_id.as_str()) {
            roots.push(edge.from_id.as_str());
        }
    }
    roots
        .into_iter()
        .flat_map(|root| closure_for_node(edges, root, max_depth))
        .collect()
}

/// Incremental update for one node: recompute only the rows rooted at it.
/// Callers replace that node's prior rows wholesale with this result —
/// closure entries rooted elsewhere are untouched, since a single node's
/// outgoing edge set changing cannot affect another root's reachability
/// unless that root can reach this node, which is exactly the entries it
/// already has recorded for `node`.
pub fn update_closure_for_node(edges: &[GraphEdge], node_id: &str, max_depth: u32) -> Vec<ClosureEntry> {
    closure_for_node(edges, node_id, max_depth)
}

/// All entries rooted at `node_id` (what `node_id` can reach).
pub fn get_descendants<'a>(entries: &'a [ClosureEntry], node_id: &str) -> Vec<&'a ClosureEntry> {
    entries.iter().filter(|e| e.from_id == node_id).collect()
}

/// All entries that reach `node_id` (what can reach `node_id`).
pub fn get_ancestors<'a>(entries: &'a [ClosureEntry], node_id: &str) -> Vec<&'a ClosureEntry> {
    entries.iter().filter(|e| e.to_id == node_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeType;

    fn edge(from: &str, to: &str) -> GraphEdge {
        GraphEdge::new("proj", from, to, EdgeType::Imports)
    }

    #[test]
    fn closure_reaches_two_hops() {
        let edges = vec![edge("a", "b"), edge("b", "c")];
        let entries = closure_for_node(&edges, "a", MAX_DEPTH);
        assert!(entries.iter().any(|e| e.to_id == "b" && e.depth == 1));
        assert!(entries.iter().any(|e| e.to_id == "c" && e.depth == 2));
    }

    #[test]
    fn closure_respects_max_depth() {
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "d")];
        let entries = closure_for_node(&edges, "a", 2);
        assert!(entries.iter().any(|e| e.to_id == "c"));
        assert!(!entries.iter().any(|e| e.to_id == "d"));
    }

    #[test]
    fn cycles_terminate_and_do_not_revisit() {
        let edges = vec![edge("a", "b"), edge("b", "a")];
        let entries = closure_for_node(&edges, "a", MAX_DEPTH);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_id, "b");
    }

    #[test]
    fn stale_edges_are_excluded() {
        let mut stale = edge("a", "b");
        stale.stale_at = Some(chrono::Utc::now());
        let entries = closure_for_node(&[stale], "a", MAX_DEPTH);
        assert!(entries.is_empty());
    }

    #[test]
    fn descendants_and_ancestors_are_complementary_views() {
        let edges = vec![edge("a", "b"), edge("a", "c")];
        let all = rebuild_closure(&edges, MAX_DEPTH);
        assert_eq!(get_descendants(&all, "a").len(), 2);
        assert_eq!(get_ancestors(&all, "b").len(), 1);
    }
}
