//! The observer's closed vocabulary of behavioral signals (§4.4.1).
//!
//! Each signal kind carries a prior (how trustworthy this pattern is as
//! evidence of a real gotcha/preference/pattern, independent of any single
//! observation) and a minimum session count before it is eligible for
//! promotion at all — a signal seen in only one session is an anecdote, not
//! a pattern, regardless of how strong its prior is.

/// Below this score a candidate is discarded outright, before it ever
/// reaches the promotion pipeline's validation stage.
pub const DISCARD_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    CoAccess,
    SelfCorrection,
    ErrorRetry,
    ParallelConflict,
    ReadAbandon,
    RepeatedGrep,
    ConfigTouch,
    LongEditSession,
    ToolChainPattern,
    CrossFileRename,
    TestFailureLoop,
    DependencyBump,
    BranchSwitchChurn,
    LargeDiffRevert,
    SearchMiss,
    RedundantRead,
    IdleGap,
}

impl SignalKind {
    pub const ALL: [SignalKind; 17] = [
        SignalKind::CoAccess,
        SignalKind::SelfCorrection,
        SignalKind::ErrorRetry,
        SignalKind::ParallelConflict,
        SignalKind::ReadAbandon,
        SignalKind::RepeatedGrep,
        SignalKind::ConfigTouch,
        SignalKind::LongEditSession,
        SignalKind::ToolChainPattern,
        SignalKind::CrossFileRename,
        SignalKind::TestFailureLoop,
        SignalKind::DependencyBump,
        SignalKind::BranchSwitchChurn,
        SignalKind::LargeDiffRevert,
        SignalKind::SearchMiss,
        SignalKind::RedundantRead,
        SignalKind::IdleGap,
    ];

    /// Baseline trust in this signal kind as evidence, before frequency or
    /// trust-gate adjustments.
    pub fn prior(self) -> f64 {
        match self {
            SignalKind::CoAccess => 0.91,
            SignalKind::SelfCorrection => 0.88,
            SignalKind::ErrorRetry => 0.85,
            SignalKind::ParallelConflict => 0.82,
            SignalKind::ReadAbandon => 0.79,
            SignalKind::RepeatedGrep => 0.75,
            SignalKind::ConfigTouch => 0.72,
            SignalKind::LongEditSession => 0.70,
            SignalKind::ToolChainPattern => 0.68,
            SignalKind::CrossFileRename => 0.66,
            SignalKind::TestFailureLoop => 0.64,
            SignalKind::DependencyBump => 0.60,
            SignalKind::BranchSwitchChurn => 0.58,
            SignalKind::LargeDiffRevert => 0.55,
            SignalKind::SearchMiss => 0.52,
            SignalKind::RedundantRead => 0.48,
            SignalKind::IdleGap => 0.42,
        }
    }

    /// Number of distinct sessions this pattern must recur in before it is
    /// eligible for promotion (the frequency filter, §4.4.4 stage 2).
    pub fn min_sessions(self) -> u32 {
        match self {
            SignalKind::SelfCorrection => 1,
            SignalKind::CoAccess
            | SignalKind::ErrorRetry
            | SignalKind::ParallelConflict
            | SignalKind::RepeatedGrep
            | SignalKind::ConfigTouch
            | SignalKind::CrossFileRename
            | SignalKind::TestFailureLoop
            | SignalKind::LargeDiffRevert => 2,
            SignalKind::ReadAbandon
            | SignalKind::LongEditSession
            | SignalKind::ToolChainPattern
            | SignalKind::DependencyBump
            | SignalKind::BranchSwitchChurn
            | SignalKind::SearchMiss
            | SignalKind::RedundantRead => 3,
            SignalKind::IdleGap => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::CoAccess => "co_access",
            SignalKind::SelfCorrection => "self_correction",
            SignalKind::ErrorRetry => "error_retry",
            SignalKind::ParallelConflict => "parallel_conflict",
            SignalKind::ReadAbandon => "read_abandon",
            SignalKind::RepeatedGrep => "repeated_grep",
            SignalKind::ConfigTouch => "config_touch",
            SignalKind::LongEditSession => "long_edit_session",
            SignalKind::ToolChainPattern => "tool_chain_pattern",
            SignalKind::CrossFileRename => "cross_file_rename",
            SignalKind::TestFailureLoop => "test_failure_loop",
            SignalKind::DependencyBump => "dependency_bump",
            SignalKind::BranchSwitchChurn => "branch_switch_churn",
            SignalKind::LargeDiffRevert => "large_diff_revert",
            SignalKind::SearchMiss => "search_miss",
            SignalKind::RedundantRead => "redundant_read",
            SignalKind::IdleGap => "idle_gap",
        }
    }
}

/// One observed instance of a signal, still session-scoped (not yet a
/// candidate memory).
#[derive(Debug, Clone)]
pub struct Signal {
    pub kind: SignalKind,
    /// Distinct sessions this exact pattern (by fingerprint/key) has now
    /// been seen in, including this one.
    pub observed_sessions: u32,
    pub originating_step: u64,
    /// Stable key identifying "the same pattern" across sessions — an error
    /// fingerprint, a file pair, a grep pattern, etc.
    pub key: String,
    pub evidence: String,
}

impl Signal {
    /// Score before the trust gate: prior scaled by how far the frequency
    /// requirement has been met, capped at the prior itself.
    pub fn score(&self) -> f64 {
        let ratio = self.observed_sessions as f64 / self.kind.min_sessions().max(1) as f64;
        (self.kind.prior() * ratio.min(1.0)).clamp(0.0, 1.0)
    }

    pub fn meets_frequency_requirement(&self) -> bool {
        self.observed_sessions >= self.kind.min_sessions()
    }
}
