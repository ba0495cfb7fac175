//! Impact analysis: "what depends on this, and what should I re-check?"
//! (spec §4.3.2).

use std::collections::HashSet;

use crate::memory::Memory;

use super::closure::{get_ancestors, ClosureEntry};
use super::{GraphEdge, GraphNode};

const TEST_PATH_MARKERS: &[&str] = &[".test.", ".spec.", "__tests__", "/test/", "/tests/"];
const MAX_AFFECTED_MEMORIES: usize = 10;

/// Result of one impact query. An unresolved `target` yields an empty result
/// with `node_id == ""`, never an error — "nothing depends on an unknown
/// symbol" is itself useful information.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ImpactResult {
    pub node_id: String,
    pub direct_dependents: Vec<String>,
    pub transitive_dependents: Vec<String>,
    pub affected_tests: Vec<String>,
    pub affected_memories: Vec<String>,
}

/// Resolve `target` against the node set: exact label match first, then a
/// suffix match (so callers can pass a bare file path or symbol name without
/// the full `project_id:file:label` form).
fn resolve_target<'a>(target: &str, nodes: &'a [GraphNode]) -> Option<&'a GraphNode> {
    nodes
        .iter()
        .find(|n| n.label == target)
        .or_else(|| nodes.iter().find(|n| n.label.ends_with(target)))
}

fn is_test_path(path: &str) -> bool {
    TEST_PATH_MARKERS.iter().any(|marker| path.contains(marker))
}

/// Compute direct dependents, transitive dependents, affected tests and
/// affected memories for `target`.
pub fn impact(
    target: &str,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    closure: &[ClosureEntry],
    memories: &[Memory],
) -> ImpactResult {
    let Some(node) = resolve_target(target, nodes) else {
        return ImpactResult::default();
    };

    let direct: Vec<String> = edges
        .iter()
        .filter(|e| !e.is_stale() && e.to_id == node.id)
        .map(|e| e.from_id.clone())
        .collect();
    let direct_set: HashSet<&str> = direct.iter().map(|s| s.as_str()).collect();

    let transitive: Vec<String> = get_ancestors(closure, &node.id)
        .into_iter()
        .map(|entry| entry.from_id.clone())
        .filter(|id| !direct_set.contains(id.as_str()) && id != &node.id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut affected_files: HashSet<String> = HashSet::new();
    let node_by_id = |id: &str| nodes.iter().find(|n| n.id == id);
    for id in direct.iter().chain(transitive.iter()) {
        if let Some(n) = node_by_id(id) {
            if let Some(path) = &n.file_path {
                affected_files.insert(path.clone());
            }
        }
    }

    let affected_tests: Vec<String> = affected_files
        .iter()
        .filter(|path| is_test_path(path))
        .cloned()
        .collect();

    let mut affected_memories: Vec<String> = memories
        .iter()
        .filter(|m| m.related_files.iter().any(|f| affected_files.contains(f)))
        .map(|m| m.id.clone())
        .collect();
    affected_memories.truncate(MAX_AFFECTED_MEMORIES);

    ImpactResult {
        node_id: node.id.clone(),
        direct_dependents: direct,
        transitive_dependents: transitive,
        affected_tests,
        affected_memories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::closure::{rebuild_closure, MAX_DEPTH};
    use crate::graph::{EdgeType, NodeKind};
    use crate::memory::MemoryKind;

    #[test]
    fn unknown_target_yields_empty_result() {
        let result = impact("nope", &[], &[], &[], &[]);
        assert_eq!(result.node_id, "");
        assert!(result.direct_dependents.is_empty());
    }

    #[test]
    fn direct_and_transitive_dependents_are_distinct() {
        let target = GraphNode::new("p", "core.ts", "core.ts:run", NodeKind::Function);
        let caller = GraphNode::new("p", "api.ts", "api.ts:handle", NodeKind::Function);
        let caller2 = GraphNode::new("p", "cli.ts", "cli.ts:main", NodeKind::Function);

        let e1 = GraphEdge::new("p", &caller.id, &target.id, EdgeType::Calls);
        let e2 = GraphEdge::new("p", &caller2.id, &caller.id, EdgeType::Calls);

        let nodes = vec![target.clone(), caller.clone(), caller2.clone()];
        let edges = vec![e1, e2];
        let closure = rebuild_closure(&edges, MAX_DEPTH);

        let result = impact("core.ts:run", &nodes, &edges, &closure, &[]);
        assert_eq!(result.direct_dependents, vec![caller.id.clone()]);
        assert_eq!(result.transitive_dependents, vec![caller2.id.clone()]);
    }

    #[test]
    fn affected_tests_match_on_path_markers() {
        let target = GraphNode::new("p", "core.ts", "core.ts:run", NodeKind::Function);
        let test_file = GraphNode::new("p", "core.test.ts", "core.test.ts:suite", NodeKind::Function);
        let edge = GraphEdge::new("p", &test_file.id, &target.id, EdgeType::Calls);
        let nodes = vec![target.clone(), test_file];
        let edges = vec![edge];
        let closure = rebuild_closure(&edges, MAX_DEPTH);

        let result = impact("core.ts:run", &nodes, &edges, &closure, &[]);
        assert_eq!(result.affected_tests, vec!["core.test.ts".to_string()]);
    }

    #[test]
    fn affected_memories_are_capped_at_ten() {
        let target = GraphNode::new("p", "core.ts", "core.ts:run", NodeKind::Function);
        let caller = GraphNode::new("p", "api.ts", "api.ts:handle", NodeKind::Function);
        let edge = GraphEdge::new("p", &caller.id, &target.id, EdgeType::Calls);
        let nodes = vec![target.clone(), caller];
        let edges = vec![edge];
        let closure = rebuild_closure(&edges, MAX_DEPTH);

        let memories: Vec<Memory> = (0..15)
            .map(|i| {
                let mut m = Memory::new("p", MemoryKind::Gotcha, format!("note {i}"));
                m.related_files.push("api.ts".to_string());
                m
            })
            .collect();

        let result = impact("core.ts:run", &nodes, &edges, &closure, &memories);
        assert_eq!(result.affected_memories.len(), 10);
    }
}
