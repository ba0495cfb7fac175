//! Observer / Scratchpad and the Promotion Pipeline (spec §3.4, §4.4).
//!
//! The observer watches one session's tool-call stream live, at a hard ≤2ms
//! per-event budget (I12) and without touching storage mid-stream (I13). It
//! accumulates cheap O(1) running counters in a [`scratchpad::Scratchpad`];
//! at session end (or on an explicit flush), [`promotion`] turns the
//! scratchpad's signals into candidate memories and runs them through the
//! five-stage promotion pipeline.

pub mod promotion;
pub mod scratchpad;
pub mod signals;

pub use promotion::{apply_trust_gate, finalize_candidates, promote, Candidate, TrustGateOutcome};
pub use scratchpad::Scratchpad;
pub use signals::{Signal, SignalKind};
