//! End-to-end coverage of the Observer/Scratchpad + Promotion Pipeline
//! (spec §4.4): a full session's worth of scratchpad activity finalized
//! into stored memories, honoring the Trust Gate along the way.

use memex_core::{apply_trust_gate, promote, Config, MemoryKind, Scratchpad, SessionType};
use memex_e2e_tests::harness::db_manager::TestDatabaseManager;

const PROJECT: &str = "observer-promotion-e2e";

#[test]
fn self_correction_promotes_into_a_gotcha_memory() {
    let db = TestDatabaseManager::new_temp();
    let mut pad = Scratchpad::new("session-1", SessionType::Build);
    pad.record_self_correction();

    let config = Config::default();
    let candidates = promote(PROJECT, &pad, SessionType::Build, &config, |_| None);

    assert_eq!(candidates.len(), 1);
    let memory = &candidates[0].memory;
    assert_eq!(memory.kind, MemoryKind::Gotcha);

    db.storage.upsert_memory(memory).unwrap();
    let stored = db.storage.get_memory(&memory.id).unwrap().unwrap();
    assert_eq!(stored.kind, MemoryKind::Gotcha);
}

#[test]
fn trust_gate_blocks_a_candidate_that_does_not_beat_existing_confidence() {
    let mut pad = Scratchpad::new("session-1", SessionType::Build);
    pad.record_self_correction();

    let config = Config::default();
    // An existing memory already holds confidence 0.95 — higher than a
    // single self-correction's score (prior 0.88) can ever beat.
    let candidates = promote(PROJECT, &pad, SessionType::Build, &config, |_| Some(0.95));

    assert!(candidates.is_empty());
}

#[test]
fn changelog_sessions_short_circuit_the_whole_pipeline() {
    let mut pad = Scratchpad::new("session-1", SessionType::Changelog);
    pad.record_self_correction();
    pad.record_config_touch("settings.toml");

    let config = Config::default();
    let candidates = promote(PROJECT, &pad, SessionType::Changelog, &config, |_| None);

    assert!(candidates.is_empty());
}

#[test]
fn promotion_never_exceeds_the_session_type_cap() {
    let mut pad = Scratchpad::new("session-1", SessionType::Roadmap);
    for i in 0..25u64 {
        pad.record_error(&format!("distinct failure mode {i}"));
        pad.record_error(&format!("distinct failure mode {i}"));
    }
    pad.record_self_correction();

    let config = Config::default();
    let candidates = promote(PROJECT, &pad, SessionType::Roadmap, &config, |_| None);

    assert!(candidates.len() <= config.promotion_cap(SessionType::Roadmap));
}

#[test]
fn acute_candidates_carry_the_confidence_penalty_and_review_flag() {
    let outcome = apply_trust_gate(0.9, None, true);
    assert!(outcome.passed);
    assert!(outcome.needs_review);
    assert!(outcome.contaminated);
    assert!(outcome.confidence < 0.9);
}
