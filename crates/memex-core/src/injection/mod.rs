//! Agent Injection Bridge (spec §4.6).
//!
//! Decides, on each agent step, whether to push a memory into context rather
//! than wait for the agent to ask for it. Three triggers are evaluated in a
//! fixed order; the first one that fires wins and the rest are skipped for
//! that step. Nothing fires during the first [`WARMUP_STEPS`] of a session —
//! early steps are establishing context and an injection would just be
//! noise.

use std::collections::HashSet;

use crate::memory::Memory;

/// Steps before the bridge will inject anything at all.
pub const WARMUP_STEPS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionTrigger {
    /// A gotcha or error-pattern memory matches the file/context the agent
    /// is currently touching.
    GotchaInjection,
    /// The scratchpad shows a pattern (repeated self-correction, a stalled
    /// loop) that a past work-state/task-calibration memory already
    /// describes.
    ScratchpadReflection,
    /// The agent is about to issue a search whose answer is already a
    /// memory — inject the answer instead of letting the search run.
    SearchShortCircuit,
}

#[derive(Debug, Clone)]
pub struct Injection {
    pub trigger: InjectionTrigger,
    pub memory_id: String,
    pub content: String,
}

/// Per-session injection state: which memories have already been pushed,
/// so the same one never fires twice in a session.
#[derive(Debug, Default)]
pub struct InjectionBridge {
    injected_ids: HashSet<String>,
}

impl InjectionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_injected(&self, memory_id: &str) -> bool {
        self.injected_ids.contains(memory_id)
    }

    /// Evaluate all three triggers in order for the current step. Returns
    /// the first one that fires, or `None`. Each candidate slice/option is
    /// expected to already be relevance-filtered by the caller (the
    /// retrieval pipeline and scratchpad own that judgment); this module
    /// only owns ordering, warmup gating and dedup.
    pub fn evaluate(
        &mut self,
        current_step: u64,
        gotcha_candidates: &[Memory],
        reflection_candidate: Option<&Memory>,
        search_answer: Option<&Memory>,
    ) -> Option<Injection> {
        if current_step < WARMUP_STEPS {
            return None;
        }

        if let Some(inj) = self.try_gotcha_injection(gotcha_candidates) {
            return Some(inj);
        }
        if let Some(inj) = self.try_scratchpad_reflection(reflection_candidate) {
            return Some(inj);
        }
        if let Some(inj) = self.try_search_short_circuit(search_answer) {
            return Some(inj);
        }
        None
    }

    fn try_gotcha_injection(&mut self, candidates: &[Memory]) -> Option<Injection> {
        let memory = candidates.iter().find(|m| !self.injected_ids.contains(&m.id))?;
        self.injected_ids.insert(memory.id.clone());
        Some(Injection {
            trigger: InjectionTrigger::GotchaInjection,
            memory_id: memory.id.clone(),
            content: memory.content.clone(),
        })
    }

    fn try_scratchpad_reflection(&mut self, candidate: Option<&Memory>) -> Option<Injection> {
        let memory = candidate.filter(|m| !self.injected_ids.contains(&m.id))?;
        self.injected_ids.insert(memory.id.clone());
        Some(Injection {
            trigger: InjectionTrigger::ScratchpadReflection,
            memory_id: memory.id.clone(),
            content: memory.content.clone(),
        })
    }

    fn try_search_short_circuit(&mut self, candidate: Option<&Memory>) -> Option<Injection> {
        let memory = candidate.filter(|m| !self.injected_ids.contains(&m.id))?;
        self.injected_ids.insert(memory.id.clone());
        Some(Injection {
            trigger: InjectionTrigger::SearchShortCircuit,
            memory_id: memory.id.clone(),
            content: memory.content.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKind;

    fn memory(content: &str) -> Memory {
        Memory::new("proj", MemoryKind::Gotcha, content)
    }

    #[test]
    fn nothing_fires_before_warmup() {
        let mut bridge = InjectionBridge::new();
        let gotcha = memory("watch out for X");
        let result = bridge.evaluate(1, &[gotcha], None, None);
        assert!(result.is_none());
    }

    #[test]
    fn gotcha_injection_wins_over_later_triggers() {
        let mut bridge = InjectionBridge::new();
        let gotcha = memory("watch out for X");
        let reflection = memory("you tried this before");
        let result = bridge.evaluate(WARMUP_STEPS, &[gotcha.clone()], Some(&reflection), None);
        assert_eq!(result.unwrap().trigger, InjectionTrigger::GotchaInjection);
    }

    #[test]
    fn falls_through_to_reflection_when_no_gotcha() {
        let mut bridge = InjectionBridge::new();
        let reflection = memory("you tried this before");
        let result = bridge.evaluate(WARMUP_STEPS, &[], Some(&reflection), None);
        assert_eq!(result.unwrap().trigger, InjectionTrigger::ScratchpadReflection);
    }

    #[test]
    fn falls_through_to_search_short_circuit_last() {
        let mut bridge = InjectionBridge::new();
        let answer = memory("the answer is 42");
        let result = bridge.evaluate(WARMUP_STEPS, &[], None, Some(&answer));
        assert_eq!(result.unwrap().trigger, InjectionTrigger::SearchShortCircuit);
    }

    #[test]
    fn same_memory_never_injected_twice() {
        let mut bridge = InjectionBridge::new();
        let gotcha = memory("watch out for X");
        let first = bridge.evaluate(WARMUP_STEPS, &[gotcha.clone()], None, None);
        assert!(first.is_some());
        let second = bridge.evaluate(WARMUP_STEPS + 1, &[gotcha], None, None);
        assert!(second.is_none());
    }
}
