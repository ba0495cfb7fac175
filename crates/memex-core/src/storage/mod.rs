//! Storage Module (spec §4.1, §6.3)
//!
//! SQLite-based persistence for memories and the knowledge graph:
//! - FTS5 full-text search with query sanitization
//! - WAL-mode tuning and unix permission hardening
//! - Closure-table maintenance for the knowledge graph

mod migrations;
mod sqlite;

pub use migrations::{apply_migrations, get_current_version, Migration, MIGRATIONS};
pub use sqlite::{Result, Storage};
