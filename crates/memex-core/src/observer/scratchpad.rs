//! Live per-session analytics (§3.4).
//!
//! Every method here is O(1) amortized and does no I/O (invariants I12,
//! I13): the scratchpad only ever touches in-memory counters, ring buffers
//! and small windows. Nothing is persisted until the session ends and
//! [`super::promotion::promote`] turns accumulated signals into candidates.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::SessionType;
use crate::fingerprint;

use super::signals::{Signal, SignalKind};

/// Capacity of the recent-tool-calls ring buffer.
const TOOL_RING_CAPACITY: usize = 8;
/// Steps within which two file accesses count as "co-accessed" (§4.4.1).
const CO_ACCESS_WINDOW: u64 = 5;
/// Steps after the external-tool-call anchor during which newly observed
/// signals are flagged acute — derived from behavior that may be an
/// artifact of whatever the external tool returned, not the agent's own
/// judgment.
const ACUTE_WINDOW: u64 = 3;

#[derive(Debug, Clone, Default)]
pub struct FileAccessStats {
    pub count: u32,
    pub first_step: u64,
    pub last_step: u64,
}

/// A signal observed while the scratchpad judged itself inside the acute
/// window — passed through the trust gate's contamination penalty.
#[derive(Debug, Clone)]
pub struct AcuteCandidate {
    pub signal: Signal,
}

pub struct Scratchpad {
    pub session_id: String,
    pub session_type: SessionType,
    current_step: u64,
    external_tool_call_step: Option<u64>,

    file_access: HashMap<String, FileAccessStats>,
    edited_files: HashSet<String>,
    grep_counts: HashMap<String, u32>,
    error_fingerprint_counts: HashMap<String, u32>,
    config_touches: HashSet<String>,

    recent_tools: VecDeque<String>,
    recent_files: VecDeque<(String, u64)>,
    co_access_counts: HashMap<(String, String), u32>,

    self_correction_count: u32,
    total_tokens: u64,

    acute_candidates: Vec<AcuteCandidate>,
}

impl Scratchpad {
    pub fn new(session_id: impl Into<String>, session_type: SessionType) -> Self {
        Self {
            session_id: session_id.into(),
            session_type,
            current_step: 0,
            external_tool_call_step: None,
            file_access: HashMap::new(),
            edited_files: HashSet::new(),
            grep_counts: HashMap::new(),
            error_fingerprint_counts: HashMap::new(),
            config_touches: HashSet::new(),
            recent_tools: VecDeque::with_capacity(TOOL_RING_CAPACITY),
            recent_files: VecDeque::new(),
            co_access_counts: HashMap::new(),
            self_correction_count: 0,
            total_tokens: 0,
            acute_candidates: Vec::new(),
        }
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    pub fn external_tool_call_step(&self) -> Option<u64> {
        self.external_tool_call_step
    }

    /// True while the scratchpad is within [`ACUTE_WINDOW`] steps of the
    /// first external tool call anchor.
    pub fn is_acute(&self) -> bool {
        match self.external_tool_call_step {
            Some(anchor) => self.current_step.saturating_sub(anchor) <= ACUTE_WINDOW,
            None => false,
        }
    }

    /// Record one tool-call step. `tool_name` feeds the recent-tools ring
    /// buffer; if it is `WebFetch`/`WebSearch` and no anchor is set yet, it
    /// becomes the `external_tool_call_step` anchor (§4.4.1).
    pub fn record_tool_call(&mut self, tool_name: &str, step: u64) {
        self.current_step = self.current_step.max(step);
        if self.recent_tools.len() == TOOL_RING_CAPACITY {
            self.recent_tools.pop_front();
        }
        self.recent_tools.push_back(tool_name.to_string());

        if self.external_tool_call_step.is_none()
            && matches!(tool_name, "WebFetch" | "WebSearch")
        {
            self.external_tool_call_step = Some(step);
        }
    }

    /// Record a file read/open, updating access stats and the co-access
    /// relation against every other file touched within the last
    /// [`CO_ACCESS_WINDOW`] steps.
    pub fn record_file_access(&mut self, path: &str, step: u64) {
        self.current_step = self.current_step.max(step);
        let stats = self.file_access.entry(path.to_string()).or_insert_with(|| FileAccessStats {
            count: 0,
            first_step: step,
            last_step: step,
        });
        stats.count += 1;
        stats.last_step = step;

        while let Some((_, oldest_step)) = self.recent_files.front() {
            if step.saturating_sub(*oldest_step) > CO_ACCESS_WINDOW {
                self.recent_files.pop_front();
            } else {
                break;
            }
        }
        for (other_path, _) in &self.recent_files {
            if other_path == path {
                continue;
            }
            let key = co_access_key(path, other_path);
            *self.co_access_counts.entry(key).or_insert(0) += 1;
        }
        self.recent_files.push_back((path.to_string(), step));
    }

    pub fn record_edit(&mut self, path: &str) {
        self.edited_files.insert(path.to_string());
    }

    pub fn record_grep(&mut self, pattern: &str) {
        *self.grep_counts.entry(pattern.to_string()).or_insert(0) += 1;
    }

    /// Record an error message, returning its fingerprint and the number of
    /// times this fingerprint has now been seen this session.
    pub fn record_error(&mut self, message: &str) -> (String, u32) {
        let fp = fingerprint::fingerprint(message);
        let count = self.error_fingerprint_counts.entry(fp.clone()).or_insert(0);
        *count += 1;
        (fp, *count)
    }

    pub fn record_self_correction(&mut self) {
        self.self_correction_count += 1;
    }

    pub fn record_config_touch(&mut self, path: &str) {
        self.config_touches.insert(path.to_string());
    }

    pub fn add_tokens(&mut self, n: u64) {
        self.total_tokens += n;
    }

    pub fn record_acute_candidate(&mut self, signal: Signal) {
        self.acute_candidates.push(AcuteCandidate { signal });
    }

    pub fn acute_candidates(&self) -> &[AcuteCandidate] {
        &self.acute_candidates
    }

    pub fn file_access_stats(&self) -> &HashMap<String, FileAccessStats> {
        &self.file_access
    }

    pub fn edited_files(&self) -> &HashSet<String> {
        &self.edited_files
    }

    pub fn grep_counts(&self) -> &HashMap<String, u32> {
        &self.grep_counts
    }

    pub fn error_fingerprint_counts(&self) -> &HashMap<String, u32> {
        &self.error_fingerprint_counts
    }

    pub fn config_touches(&self) -> &HashSet<String> {
        &self.config_touches
    }

    pub fn co_access_counts(&self) -> &HashMap<(String, String), u32> {
        &self.co_access_counts
    }

    pub fn self_correction_count(&self) -> u32 {
        self.self_correction_count
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn recent_tools(&self) -> &VecDeque<String> {
        &self.recent_tools
    }
}

fn co_access_key(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_ring_buffer_caps_at_eight() {
        let mut pad = Scratchpad::new("s1", SessionType::Build);
        for i in 0..20u64 {
            pad.record_tool_call("Read", i);
        }
        assert_eq!(pad.recent_tools().len(), TOOL_RING_CAPACITY);
    }

    #[test]
    fn first_web_fetch_sets_anchor_once() {
        let mut pad = Scratchpad::new("s1", SessionType::Build);
        pad.record_tool_call("Read", 0);
        pad.record_tool_call("WebFetch", 1);
        pad.record_tool_call("WebSearch", 5);
        assert_eq!(pad.external_tool_call_step(), Some(1));
    }

    #[test]
    fn co_access_counts_within_window() {
        let mut pad = Scratchpad::new("s1", SessionType::Build);
        pad.record_file_access("a.ts", 0);
        pad.record_file_access("b.ts", 3);
        pad.record_file_access("c.ts", 20);
        assert_eq!(
            pad.co_access_counts().get(&co_access_key("a.ts", "b.ts")),
            Some(&1)
        );
        assert!(pad.co_access_counts().get(&co_access_key("a.ts", "c.ts")).is_none());
    }

    #[test]
    fn error_fingerprint_counts_repeat_occurrences() {
        let mut pad = Scratchpad::new("s1", SessionType::Build);
        let (fp1, c1) = pad.record_error("file /a/b.ts:1: X undefined");
        let (fp2, c2) = pad.record_error("file /a/b.ts:99: X undefined");
        assert_eq!(fp1, fp2);
        assert_eq!(c1, 1);
        assert_eq!(c2, 2);
    }

    #[test]
    fn is_acute_within_window_of_anchor() {
        let mut pad = Scratchpad::new("s1", SessionType::Build);
        pad.record_tool_call("WebSearch", 2);
        pad.record_tool_call("Read", 4);
        assert!(pad.is_acute());
        pad.record_tool_call("Read", 10);
        assert!(!pad.is_acute());
    }
}
