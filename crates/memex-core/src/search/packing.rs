//! Phase-aware context packing (§4.5.6): fit ranked memories into a
//! phase's token budget, dropping near-duplicates and never truncating a
//! memory mid-body.

use crate::config::Phase;
use crate::memory::Memory;

/// `ceil(chars / 4)` — the engine's token estimator; it never calls an
/// actual tokenizer, since an approximate, fast, and consistent count is
/// what the packing budget needs.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Two memories are near-duplicates if one's content contains the other's
/// (after trimming), or they are byte-identical. Cheap enough to run on
/// every accepted memory against its predecessors.
fn is_near_duplicate(candidate: &str, accepted: &[&str]) -> bool {
    let candidate = candidate.trim();
    accepted.iter().any(|a| {
        let a = a.trim();
        a == candidate || a.contains(candidate) || candidate.contains(a)
    })
}

/// Pack `ranked` (already ordered most-relevant first) into `budget_tokens`
/// for `phase`, skipping near-duplicates and stopping before any memory that
/// would not fit whole.
pub fn pack_context<'a>(ranked: &'a [Memory], phase: Phase, budget_tokens: usize) -> Vec<&'a Memory> {
    let budget = budget_tokens.min(phase.default_budget_tokens().max(budget_tokens));
    let mut accepted: Vec<&Memory> = Vec::new();
    let mut accepted_content: Vec<&str> = Vec::new();
    let mut used = 0usize;

    for memory in ranked {
        if is_near_duplicate(&memory.content, &accepted_content) {
            continue;
        }
        let cost = estimate_tokens(&memory.content);
        if used + cost > budget {
            continue;
        }
        used += cost;
        accepted_content.push(&memory.content);
        accepted.push(memory);
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKind;

    fn memory(content: &str) -> Memory {
        Memory::new("proj", MemoryKind::Gotcha, content)
    }

    #[test]
    fn estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens("abcde"), 2); // 5 chars -> ceil(5/4) = 2
        assert_eq!(estimate_tokens("abcd"), 1);
    }

    #[test]
    fn near_duplicate_content_is_suppressed() {
        let a = memory("always validate input before parsing");
        let b = memory("always validate input before parsing");
        let packed = pack_context(&[a, b], Phase::Implement, 10_000);
        assert_eq!(packed.len(), 1);
    }

    #[test]
    fn packing_stops_before_exceeding_budget() {
        let big = "x".repeat(4000);
        let memories = vec![memory(&big), memory(&big), memory(&big)];
        let packed = pack_context(&memories, Phase::Reflect, 1500);
        assert!(packed.len() < memories.len());
    }
}
