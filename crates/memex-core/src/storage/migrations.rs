//! Database Migrations
//!
//! Schema migration definitions for the storage layer (§6.3).

/// Migration definitions, applied in order against `schema_version`.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: memories, knowledge graph, closure table",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Embedding cache and observer co-access/error-pattern tables",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    content TEXT NOT NULL,
    confidence REAL NOT NULL DEFAULT 0.5,
    tags TEXT NOT NULL DEFAULT '[]',
    related_files TEXT NOT NULL DEFAULT '[]',
    related_modules TEXT NOT NULL DEFAULT '[]',
    scope TEXT NOT NULL DEFAULT 'global',
    source TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_accessed_at TEXT NOT NULL,
    access_count INTEGER NOT NULL DEFAULT 0,
    session_id TEXT,
    commit_hash TEXT,
    reinforced_by_sessions TEXT NOT NULL DEFAULT '[]',
    target_node_id TEXT,
    impacted_node_ids TEXT NOT NULL DEFAULT '[]',
    needs_review INTEGER NOT NULL DEFAULT 0,
    user_verified INTEGER NOT NULL DEFAULT 0,
    pinned INTEGER NOT NULL DEFAULT 0,
    deprecated INTEGER NOT NULL DEFAULT 0,
    stale_at TEXT,
    chunk_kind TEXT,
    chunk_start_line INTEGER,
    chunk_end_line INTEGER,
    chunk_context_prefix TEXT,
    embedding_model_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_memories_project_kind ON memories(project_id, kind);
CREATE INDEX IF NOT EXISTS idx_memories_deprecated ON memories(deprecated);

CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    content,
    tags,
    content='memories',
    content_rowid='rowid',
    tokenize='porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
    INSERT INTO memories_fts(rowid, content, tags) VALUES (new.rowid, new.content, new.tags);
END;
CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, content, tags) VALUES ('delete', old.rowid, old.content, old.tags);
END;
CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, content, tags) VALUES ('delete', old.rowid, old.content, old.tags);
    INSERT INTO memories_fts(rowid, content, tags) VALUES (new.rowid, new.content, new.tags);
END;

CREATE TABLE IF NOT EXISTS memory_embeddings (
    memory_id TEXT PRIMARY KEY REFERENCES memories(id) ON DELETE CASCADE,
    model_id TEXT NOT NULL,
    dims INTEGER NOT NULL,
    vector BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS graph_nodes (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    label TEXT NOT NULL,
    file_path TEXT,
    language TEXT,
    line_start INTEGER,
    line_end INTEGER,
    layer INTEGER NOT NULL DEFAULT 1,
    source TEXT NOT NULL DEFAULT 'ast',
    confidence TEXT NOT NULL DEFAULT 'confirmed',
    stale_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_graph_nodes_project_file ON graph_nodes(project_id, file_path);
CREATE INDEX IF NOT EXISTS idx_graph_nodes_stale ON graph_nodes(stale_at);

CREATE TABLE IF NOT EXISTS graph_edges (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    edge_type TEXT NOT NULL,
    weight REAL NOT NULL DEFAULT 1.0,
    confidence REAL NOT NULL DEFAULT 1.0,
    stale_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_graph_edges_from ON graph_edges(from_id);
CREATE INDEX IF NOT EXISTS idx_graph_edges_to ON graph_edges(to_id);
CREATE INDEX IF NOT EXISTS idx_graph_edges_project ON graph_edges(project_id);

CREATE TABLE IF NOT EXISTS graph_closure (
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    depth INTEGER NOT NULL,
    path_edge_id TEXT NOT NULL,
    PRIMARY KEY (from_id, to_id)
);

CREATE INDEX IF NOT EXISTS idx_closure_to ON graph_closure(to_id);

CREATE TABLE IF NOT EXISTS graph_index_state (
    project_id TEXT PRIMARY KEY,
    last_full_rebuild_at TEXT,
    last_incremental_at TEXT
);

INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS embedding_cache (
    cache_key TEXT PRIMARY KEY,
    model_id TEXT NOT NULL,
    dims INTEGER NOT NULL,
    vector BLOB NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS observer_co_access (
    project_id TEXT NOT NULL,
    file_a TEXT NOT NULL,
    file_b TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    sessions_seen INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (project_id, file_a, file_b)
);

CREATE TABLE IF NOT EXISTS observer_error_patterns (
    project_id TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    occurrences INTEGER NOT NULL DEFAULT 0,
    sessions_seen INTEGER NOT NULL DEFAULT 0,
    last_seen_at TEXT NOT NULL,
    PRIMARY KEY (project_id, fingerprint)
);

INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// Current schema version recorded in `schema_version`.
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply every migration newer than the database's current schema version.
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn).unwrap_or(0);
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                description = migration.description,
                "applying migration"
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
