//! Engine configuration
//!
//! All tunables called out by the spec live here with their documented
//! defaults. Nothing in the engine reads an env var or constant directly
//! outside this module — components are handed a `Config` (or a slice of it)
//! at construction time.

use std::collections::HashMap;

use crate::memory::MemoryKind;

/// Session type used by the observer's promotion pipeline to cap output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Build,
    PrReview,
    Insights,
    Roadmap,
    Terminal,
    SpecCreation,
    Changelog,
}

impl SessionType {
    /// Maximum number of candidates the promotion pipeline may keep for this
    /// session type (§4.4.4).
    pub fn promotion_cap(self) -> usize {
        match self {
            SessionType::Build => 20,
            SessionType::PrReview => 8,
            SessionType::Insights => 5,
            SessionType::Roadmap => 3,
            SessionType::Terminal => 3,
            SessionType::SpecCreation => 3,
            SessionType::Changelog => 0,
        }
    }
}

/// Universal methodology phase (§4.5.6, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Define,
    Implement,
    Validate,
    Refine,
    Explore,
    Reflect,
}

impl Phase {
    pub fn default_budget_tokens(self) -> usize {
        match self {
            Phase::Define => 2500,
            Phase::Implement => 3000,
            Phase::Validate => 2500,
            Phase::Refine => 2000,
            Phase::Explore => 2000,
            Phase::Reflect => 1500,
        }
    }
}

/// Top-level engine configuration (§6.4).
#[derive(Debug, Clone)]
pub struct Config {
    /// Cap on BFS depth in closure computation.
    pub max_closure_depth: u32,
    /// Agent steps before active injection begins.
    pub warmup_steps: u64,
    /// Reciprocal rank fusion constant.
    pub rrf_k: f32,
    /// Number of top-ranked candidates whose files seed the neighborhood boost.
    pub graph_boost_topk: usize,
    /// Weight applied to the neighborhood-boost bonus.
    pub boost_weight: f32,
    /// Observer hard per-event budget, in milliseconds.
    pub observer_budget_ms: u64,
    /// Per session-type promotion cap, overriding `SessionType::promotion_cap`
    /// when present.
    pub session_type_promotion_limits: HashMap<SessionType, usize>,
    /// Per-phase token budget, overriding `Phase::default_budget_tokens`.
    pub phase_packing_budgets: HashMap<Phase, usize>,
    /// Decay half-life in days per memory kind; `None` means "never decays".
    pub default_decay_half_lives_by_kind: HashMap<MemoryKind, Option<f64>>,
    /// Embedding cache entry lifetime, in days.
    pub embedding_cache_ttl_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_closure_depth: 5,
            warmup_steps: 5,
            rrf_k: 60.0,
            graph_boost_topk: 10,
            boost_weight: 0.3,
            observer_budget_ms: 2,
            session_type_promotion_limits: HashMap::new(),
            phase_packing_budgets: HashMap::new(),
            default_decay_half_lives_by_kind: MemoryKind::default_half_lives(),
            embedding_cache_ttl_days: 7,
        }
    }
}

impl Config {
    pub fn promotion_cap(&self, session_type: SessionType) -> usize {
        self.session_type_promotion_limits
            .get(&session_type)
            .copied()
            .unwrap_or_else(|| session_type.promotion_cap())
    }

    pub fn phase_budget(&self, phase: Phase) -> usize {
        self.phase_packing_budgets
            .get(&phase)
            .copied()
            .unwrap_or_else(|| phase.default_budget_tokens())
    }

    pub fn decay_half_life(&self, kind: MemoryKind) -> Option<f64> {
        self.default_decay_half_lives_by_kind
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_half_life_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_caps_match_spec_table() {
        assert_eq!(SessionType::Build.promotion_cap(), 20);
        assert_eq!(SessionType::PrReview.promotion_cap(), 8);
        assert_eq!(SessionType::Insights.promotion_cap(), 5);
        assert_eq!(SessionType::Roadmap.promotion_cap(), 3);
        assert_eq!(SessionType::Terminal.promotion_cap(), 3);
        assert_eq!(SessionType::SpecCreation.promotion_cap(), 3);
        assert_eq!(SessionType::Changelog.promotion_cap(), 0);
    }

    #[test]
    fn config_override_wins_over_default() {
        let mut cfg = Config::default();
        cfg.session_type_promotion_limits.insert(SessionType::Build, 1);
        assert_eq!(cfg.promotion_cap(SessionType::Build), 1);
        assert_eq!(cfg.promotion_cap(SessionType::Insights), 5);
    }
}
