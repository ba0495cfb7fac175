//! End-to-end coverage of the Agent Injection Bridge (spec §4.6) wired to
//! real storage: a stored gotcha gets surfaced once warmup passes, and never
//! injected twice in the same session.

use memex_core::{InjectionBridge, Memory, MemoryKind, WARMUP_STEPS};
use memex_e2e_tests::harness::db_manager::TestDatabaseManager;

const PROJECT: &str = "injection-bridge-e2e";

fn stored_gotcha(db: &TestDatabaseManager, content: &str, related_file: &str) -> Memory {
    let mut memory = Memory::new(PROJECT, MemoryKind::Gotcha, content);
    memory.confidence = 0.9;
    memory.related_files = vec![related_file.to_string()];
    db.storage.upsert_memory(&memory).unwrap();
    memory
}

#[test]
fn stored_gotcha_injects_once_warmup_passes_and_touches_the_right_file() {
    let db = TestDatabaseManager::new_temp();
    let gotcha = stored_gotcha(&db, "this endpoint needs an idempotency key", "src/api/pay.rs");

    let mut bridge = InjectionBridge::new();

    // Before warmup, nothing fires even if the candidate matches.
    let before = bridge.evaluate(WARMUP_STEPS - 1, &[gotcha.clone()], None, None);
    assert!(before.is_none());

    let after = bridge.evaluate(WARMUP_STEPS, &[gotcha.clone()], None, None);
    let injection = after.expect("gotcha should inject once warmup is reached");
    assert_eq!(injection.memory_id, gotcha.id);
    assert_eq!(injection.content, gotcha.content);
}

#[test]
fn injected_memory_is_not_repeated_in_the_same_session() {
    let db = TestDatabaseManager::new_temp();
    let gotcha = stored_gotcha(&db, "retries must be idempotent", "src/jobs/retry.rs");

    let mut bridge = InjectionBridge::new();
    let first = bridge.evaluate(WARMUP_STEPS, &[gotcha.clone()], None, None);
    assert!(first.is_some());

    let second = bridge.evaluate(WARMUP_STEPS + 1, &[gotcha], None, None);
    assert!(second.is_none(), "the bridge must not inject the same memory twice per session");
}

#[test]
fn low_confidence_memories_never_reach_the_bridge_as_gotcha_candidates() {
    let db = TestDatabaseManager::new_temp();
    let mut weak = Memory::new(PROJECT, MemoryKind::Gotcha, "might be nothing");
    weak.confidence = 0.2;
    db.storage.upsert_memory(&weak).unwrap();

    // Simulating the runtime's confidence filter: a caller building gotcha
    // candidates from storage should exclude anything below the §4.6
    // threshold before ever handing it to the bridge.
    const MIN_CONFIDENCE: f64 = 0.65;
    let all = db
        .storage
        .list_memories_by_kind(PROJECT, MemoryKind::Gotcha)
        .unwrap();
    let candidates: Vec<Memory> = all.into_iter().filter(|m| m.confidence >= MIN_CONFIDENCE).collect();
    assert!(candidates.is_empty());
}
