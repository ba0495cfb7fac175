//! End-to-end coverage of the Store (spec §4.1): upsert/get round-trips,
//! full-text search, and kind-scoped listing.

use memex_core::{Memory, MemoryKind};
use memex_e2e_tests::harness::db_manager::TestDatabaseManager;

const PROJECT: &str = "memory-store-e2e";

#[test]
fn upsert_then_get_round_trips_content() {
    let db = TestDatabaseManager::new_temp();
    let memory = Memory::new(PROJECT, MemoryKind::Decision, "use sqlite for the store");
    db.storage.upsert_memory(&memory).unwrap();

    let fetched = db.storage.get_memory(&memory.id).unwrap().unwrap();
    assert_eq!(fetched.id, memory.id);
    assert_eq!(fetched.content, "use sqlite for the store");
    assert_eq!(fetched.kind, MemoryKind::Decision);
}

#[test]
fn upsert_is_idempotent_on_id() {
    let db = TestDatabaseManager::new_temp();
    let mut memory = Memory::new(PROJECT, MemoryKind::Gotcha, "original content");
    db.storage.upsert_memory(&memory).unwrap();

    memory.content = "revised content".to_string();
    db.storage.upsert_memory(&memory).unwrap();

    let all = db.storage.list_all_memories(PROJECT).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].content, "revised content");
}

#[test]
fn full_text_search_finds_matching_memories() {
    let db = TestDatabaseManager::new_temp();
    let a = Memory::new(PROJECT, MemoryKind::Pattern, "retries should use exponential backoff");
    let b = Memory::new(PROJECT, MemoryKind::Pattern, "the config loader reads from TOML");
    db.storage.upsert_memory(&a).unwrap();
    db.storage.upsert_memory(&b).unwrap();

    let hits = db.storage.search_full_text(PROJECT, "backoff", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, a.id);
}

#[test]
fn list_memories_by_kind_filters_correctly() {
    let mut db = TestDatabaseManager::new_temp();
    db.seed_memories(PROJECT, MemoryKind::Gotcha, 3);
    db.seed_memories(PROJECT, MemoryKind::Decision, 2);

    let gotchas = db.storage.list_memories_by_kind(PROJECT, MemoryKind::Gotcha).unwrap();
    let decisions = db.storage.list_memories_by_kind(PROJECT, MemoryKind::Decision).unwrap();

    assert_eq!(gotchas.len(), 3);
    assert_eq!(decisions.len(), 2);
}

#[test]
fn delete_memory_removes_it_from_storage_and_search() {
    let db = TestDatabaseManager::new_temp();
    let memory = Memory::new(PROJECT, MemoryKind::ErrorPattern, "panics on empty input");
    db.storage.upsert_memory(&memory).unwrap();

    db.storage.delete_memory(&memory.id).unwrap();

    assert!(db.storage.get_memory(&memory.id).unwrap().is_none());
    let hits = db.storage.search_full_text(PROJECT, "panics", 10).unwrap();
    assert!(hits.is_empty());
}
