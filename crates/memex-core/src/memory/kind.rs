//! The closed enumeration of memory kinds (glossary) and their default decay
//! half-lives (§6.4 `default_decay_half_lives_by_kind`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Gotcha,
    Decision,
    Preference,
    Pattern,
    Requirement,
    ErrorPattern,
    ModuleInsight,
    PrefetchPattern,
    WorkState,
    CausalDependency,
    TaskCalibration,
    E2eObservation,
    DeadEnd,
    WorkUnitOutcome,
    WorkflowRecipe,
    ContextCost,
}

impl MemoryKind {
    pub const ALL: [MemoryKind; 16] = [
        MemoryKind::Gotcha,
        MemoryKind::Decision,
        MemoryKind::Preference,
        MemoryKind::Pattern,
        MemoryKind::Requirement,
        MemoryKind::ErrorPattern,
        MemoryKind::ModuleInsight,
        MemoryKind::PrefetchPattern,
        MemoryKind::WorkState,
        MemoryKind::CausalDependency,
        MemoryKind::TaskCalibration,
        MemoryKind::E2eObservation,
        MemoryKind::DeadEnd,
        MemoryKind::WorkUnitOutcome,
        MemoryKind::WorkflowRecipe,
        MemoryKind::ContextCost,
    ];

    /// Default decay half-life in days. `None` means the kind never decays
    /// (e.g. `decisions` are treated as durable unless explicitly deprecated).
    pub fn default_half_life_days(self) -> Option<f64> {
        match self {
            MemoryKind::Decision => None,
            MemoryKind::Requirement => None,
            MemoryKind::Preference => None,
            MemoryKind::WorkState => Some(7.0),
            MemoryKind::TaskCalibration => Some(14.0),
            MemoryKind::E2eObservation => Some(30.0),
            MemoryKind::ContextCost => Some(30.0),
            MemoryKind::Gotcha => Some(90.0),
            MemoryKind::ErrorPattern => Some(90.0),
            MemoryKind::DeadEnd => Some(60.0),
            MemoryKind::Pattern => Some(180.0),
            MemoryKind::ModuleInsight => Some(180.0),
            MemoryKind::PrefetchPattern => Some(45.0),
            MemoryKind::CausalDependency => Some(180.0),
            MemoryKind::WorkUnitOutcome => Some(60.0),
            MemoryKind::WorkflowRecipe => Some(365.0),
        }
    }

    pub fn default_half_lives() -> HashMap<MemoryKind, Option<f64>> {
        MemoryKind::ALL
            .iter()
            .map(|k| (*k, k.default_half_life_days()))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemoryKind::Gotcha => "gotcha",
            MemoryKind::Decision => "decision",
            MemoryKind::Preference => "preference",
            MemoryKind::Pattern => "pattern",
            MemoryKind::Requirement => "requirement",
            MemoryKind::ErrorPattern => "error_pattern",
            MemoryKind::ModuleInsight => "module_insight",
            MemoryKind::PrefetchPattern => "prefetch_pattern",
            MemoryKind::WorkState => "work_state",
            MemoryKind::CausalDependency => "causal_dependency",
            MemoryKind::TaskCalibration => "task_calibration",
            MemoryKind::E2eObservation => "e2e_observation",
            MemoryKind::DeadEnd => "dead_end",
            MemoryKind::WorkUnitOutcome => "work_unit_outcome",
            MemoryKind::WorkflowRecipe => "workflow_recipe",
            MemoryKind::ContextCost => "context_cost",
        }
    }

    pub fn parse_name(s: &str) -> Option<Self> {
        MemoryKind::ALL.iter().find(|k| k.as_str() == s).copied()
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sixteen_kinds_round_trip_through_their_name() {
        for kind in MemoryKind::ALL {
            assert_eq!(MemoryKind::parse_name(kind.as_str()), Some(kind));
        }
        assert_eq!(MemoryKind::ALL.len(), 16);
    }

    #[test]
    fn decisions_never_decay() {
        assert_eq!(MemoryKind::Decision.default_half_life_days(), None);
    }
}
