//! Test Database Manager
//!
//! Provides isolated `Storage` instances for end-to-end tests: temporary
//! databases that are cleaned up automatically, plus seeding helpers for
//! common memory shapes.

use memex_core::{Memory, MemoryKind, Storage};
use std::path::PathBuf;
use tempfile::TempDir;

/// Manager for test databases.
///
/// Creates an isolated [`Storage`] per test to prevent interference.
/// Automatically cleans up its temporary directory when dropped.
pub struct TestDatabaseManager {
    pub storage: Storage,
    _temp_dir: Option<TempDir>,
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let db_path = temp_dir.path().join("test_memex.db");

        let storage = Storage::new(Some(db_path.clone())).expect("failed to create test storage");

        Self {
            storage,
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path. Not cleaned up automatically.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("failed to create test storage");
        Self {
            storage,
            _temp_dir: None,
            db_path: path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn is_empty(&self, project_id: &str) -> bool {
        self.memory_count(project_id) == 0
    }

    pub fn memory_count(&self, project_id: &str) -> usize {
        self.storage
            .list_all_memories(project_id)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Seed the database with `count` plain memories of the given kind.
    pub fn seed_memories(&mut self, project_id: &str, kind: MemoryKind, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let mut memory = Memory::new(project_id, kind, format!("test memory content {i}"));
            memory.tags = vec![format!("test-{}", i % 5)];
            self.storage
                .upsert_memory(&memory)
                .expect("seed memory upsert failed");
            ids.push(memory.id);
        }
        ids
    }

    /// Seed with one memory per kind in `kinds`.
    pub fn seed_diverse(&mut self, project_id: &str, kinds: &[MemoryKind]) -> Vec<String> {
        let mut ids = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let memory = Memory::new(project_id, *kind, format!("a {} memory", kind.as_str()));
            self.storage
                .upsert_memory(&memory)
                .expect("seed memory upsert failed");
            ids.push(memory.id);
        }
        ids
    }

    /// Clear all memories for a project.
    pub fn clear(&mut self, project_id: &str) {
        if let Ok(memories) = self.storage.list_all_memories(project_id) {
            for memory in memories {
                let _ = self.storage.delete_memory(&memory.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_database_starts_empty() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty("proj"));
        assert!(db.path().parent().unwrap().exists());
    }

    #[test]
    fn seed_memories_are_counted() {
        let mut db = TestDatabaseManager::new_temp();
        let ids = db.seed_memories("proj", MemoryKind::Pattern, 10);
        assert_eq!(ids.len(), 10);
        assert_eq!(db.memory_count("proj"), 10);
    }

    #[test]
    fn clear_removes_all_memories() {
        let mut db = TestDatabaseManager::new_temp();
        db.seed_memories("proj", MemoryKind::Pattern, 5);
        assert_eq!(db.memory_count("proj"), 5);
        db.clear("proj");
        assert!(db.is_empty("proj"));
    }
}
