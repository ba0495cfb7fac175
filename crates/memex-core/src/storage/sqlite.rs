//! SQLite Storage Implementation (spec §4.1, §6.3)
//!
//! Single source of truth for memories and the knowledge graph. Uses
//! separate reader/writer connections for interior mutability — all methods
//! take `&self`, so the runtime can hold `Arc<Storage>` instead of
//! `Arc<Mutex<Storage>>`.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Config;
use crate::error::EngineError;
use crate::graph::closure::{self, ClosureEntry};
use crate::graph::impact::{self, ImpactResult};
use crate::graph::{EdgeType, GraphEdge, GraphNode, Layer, NodeConfidence, NodeKind, NodeSource};
use crate::memory::{
    ChunkKind, ChunkMetadata, GraphLink, LifecycleFlags, Memory, MemoryKind, MemoryScope,
    MemorySource, Provenance,
};

pub use crate::error::Result;

/// The §4.1 Store: owns the SQLite connections and all persistence for
/// memories and the knowledge graph. Embedding generation and vector-index
/// search live alongside it (see [`crate::embeddings`], [`crate::search`])
/// but are wired up by the runtime, not owned here.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    config: Config,
}

impl Storage {
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("MEMEX_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)
                        .map_err(EngineError::from_rusqlite_retryable)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA mmap_size = 268435456;",
        )
        .map_err(EngineError::from_rusqlite_retryable)?;

        Ok(())
    }

    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        Self::with_config(db_path, Config::default())
    }

    pub fn with_config(db_path: Option<PathBuf>, config: Config) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "memex", "core")
                    .ok_or_else(|| EngineError::StorageFatal("could not determine project directories".into()))?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("memex.db")
            }
        };

        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)
            .map_err(EngineError::from_rusqlite_retryable)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| EngineError::StorageFatal("writer connection lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| EngineError::StorageFatal("reader connection lock poisoned".into()))
    }

    // ------------------------------------------------------------------
    // Memories (§4.1 Store)
    // ------------------------------------------------------------------

    pub fn upsert_memory(&self, memory: &Memory) -> Result<()> {
        let conn = self.writer()?;
        conn.execute(
            "INSERT INTO memories (
                id, project_id, kind, content, confidence, tags, related_files, related_modules,
                scope, source, created_at, last_accessed_at, access_count, session_id, commit_hash,
                reinforced_by_sessions, target_node_id, impacted_node_ids, needs_review,
                user_verified, pinned, deprecated, stale_at, chunk_kind, chunk_start_line,
                chunk_end_line, chunk_context_prefix, embedding_model_id
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,?25,?26,?27,?28)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                confidence = excluded.confidence,
                tags = excluded.tags,
                related_files = excluded.related_files,
                related_modules = excluded.related_modules,
                scope = excluded.scope,
                last_accessed_at = excluded.last_accessed_at,
                access_count = excluded.access_count,
                reinforced_by_sessions = excluded.reinforced_by_sessions,
                target_node_id = excluded.target_node_id,
                impacted_node_ids = excluded.impacted_node_ids,
                needs_review = excluded.needs_review,
                user_verified = excluded.user_verified,
                pinned = excluded.pinned,
                deprecated = excluded.deprecated,
                stale_at = excluded.stale_at,
                embedding_model_id = excluded.embedding_model_id",
            params![
                memory.id,
                memory.project_id,
                memory.kind.as_str(),
                memory.content,
                memory.confidence,
                serde_json::to_string(&memory.tags)?,
                serde_json::to_string(&memory.related_files)?,
                serde_json::to_string(&memory.related_modules)?,
                scope_as_str(memory.scope),
                source_as_str(memory.source),
                memory.created_at.to_rfc3339(),
                memory.last_accessed_at.to_rfc3339(),
                memory.access_count as i64,
                memory.provenance.session_id,
                memory.provenance.commit_hash,
                serde_json::to_string(&memory.provenance.reinforced_by_sessions)?,
                memory.graph_link.target_node_id,
                serde_json::to_string(&memory.graph_link.impacted_node_ids)?,
                memory.lifecycle.needs_review,
                memory.lifecycle.user_verified,
                memory.lifecycle.pinned,
                memory.lifecycle.deprecated,
                memory.lifecycle.stale_at.map(|t| t.to_rfc3339()),
                memory.chunk.as_ref().and_then(|c| c.chunk_kind).map(chunk_kind_as_str),
                memory.chunk.as_ref().and_then(|c| c.start_line),
                memory.chunk.as_ref().and_then(|c| c.end_line),
                memory.chunk.as_ref().and_then(|c| c.context_prefix.clone()),
                memory.embedding_model_id,
            ],
        )?;
        Ok(())
    }

    pub fn get_memory(&self, id: &str) -> Result<Option<Memory>> {
        let conn = self.reader()?;
        conn.query_row("SELECT * FROM memories WHERE id = ?1", params![id], row_to_memory)
            .optional()
            .map_err(EngineError::from)
    }

    pub fn delete_memory(&self, id: &str) -> Result<()> {
        self.writer()?.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Full-text candidate path (§4.5.2): FTS5 over content+tags, scoped to
    /// `project_id`, excluding deprecated memories.
    pub fn search_full_text(&self, project_id: &str, query: &str, limit: usize) -> Result<Vec<(String, f32)>> {
        let conn = self.reader()?;
        let hits = crate::search::KeywordSearcher::search(&conn, project_id, query, limit)?;
        Ok(hits.into_iter().map(|h| (h.memory_id, -h.bm25_rank as f32)).collect())
    }

    pub fn list_memories_by_kind(&self, project_id: &str, kind: MemoryKind) -> Result<Vec<Memory>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM memories WHERE project_id = ?1 AND kind = ?2 AND deprecated = 0",
        )?;
        let rows = stmt.query_map(params![project_id, kind.as_str()], row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    pub fn list_all_memories(&self, project_id: &str) -> Result<Vec<Memory>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT * FROM memories WHERE project_id = ?1")?;
        let rows = stmt.query_map(params![project_id], row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    // ------------------------------------------------------------------
    // Knowledge graph nodes/edges (§4.3)
    // ------------------------------------------------------------------

    pub fn upsert_node(&self, node: &GraphNode) -> Result<()> {
        self.writer()?.execute(
            "INSERT INTO graph_nodes (id, project_id, kind, label, file_path, language, line_start, line_end, layer, source, confidence, stale_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)
             ON CONFLICT(id) DO UPDATE SET
                file_path = excluded.file_path, language = excluded.language,
                line_start = excluded.line_start, line_end = excluded.line_end,
                stale_at = NULL",
            params![
                node.id, node.project_id, node.kind.as_str(), node.label, node.file_path,
                node.language, node.line_start, node.line_end, node.layer as i32,
                node_source_as_str(node.source), node_confidence_as_str(node.confidence),
                node.stale_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn upsert_edge(&self, edge: &GraphEdge) -> Result<()> {
        self.writer()?.execute(
            "INSERT INTO graph_edges (id, project_id, from_id, to_id, edge_type, weight, confidence, stale_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
             ON CONFLICT(id) DO UPDATE SET weight = excluded.weight, confidence = excluded.confidence, stale_at = NULL",
            params![
                edge.id, edge.project_id, edge.from_id, edge.to_id, edge.edge_type.as_str(),
                edge.weight, edge.confidence, edge.stale_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn get_nodes_by_file(&self, project_id: &str, file_path: &str) -> Result<Vec<GraphNode>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM graph_nodes WHERE project_id = ?1 AND file_path = ?2",
        )?;
        let rows = stmt.query_map(params![project_id, file_path], row_to_node)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    pub fn get_all_nodes(&self, project_id: &str) -> Result<Vec<GraphNode>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT * FROM graph_nodes WHERE project_id = ?1")?;
        let rows = stmt.query_map(params![project_id], row_to_node)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    pub fn get_all_edges(&self, project_id: &str) -> Result<Vec<GraphEdge>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT * FROM graph_edges WHERE project_id = ?1")?;
        let rows = stmt.query_map(params![project_id], row_to_edge)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    pub fn get_edges_from(&self, node_id: &str) -> Result<Vec<GraphEdge>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT * FROM graph_edges WHERE from_id = ?1")?;
        let rows = stmt.query_map(params![node_id], row_to_edge)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    pub fn get_edges_to(&self, node_id: &str) -> Result<Vec<GraphEdge>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT * FROM graph_edges WHERE to_id = ?1")?;
        let rows = stmt.query_map(params![node_id], row_to_edge)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    /// Mark every node belonging to `file_path` stale (staleness protocol,
    /// §4.3) — called right before re-extracting a changed file.
    pub fn mark_file_nodes_stale(&self, project_id: &str, file_path: &str) -> Result<()> {
        self.writer()?.execute(
            "UPDATE graph_nodes SET stale_at = ?1 WHERE project_id = ?2 AND file_path = ?3 AND stale_at IS NULL",
            params![Utc::now().to_rfc3339(), project_id, file_path],
        )?;
        Ok(())
    }

    pub fn mark_file_edges_stale(&self, project_id: &str, file_path: &str) -> Result<()> {
        self.writer()?.execute(
            "UPDATE graph_edges SET stale_at = ?1
             WHERE project_id = ?2 AND stale_at IS NULL AND from_id IN (
                 SELECT id FROM graph_nodes WHERE project_id = ?2 AND file_path = ?3
             )",
            params![Utc::now().to_rfc3339(), project_id, file_path],
        )?;
        Ok(())
    }

    pub fn clear_file_edges_stale(&self, project_id: &str, file_path: &str) -> Result<()> {
        self.writer()?.execute(
            "UPDATE graph_edges SET stale_at = NULL
             WHERE project_id = ?1 AND from_id IN (
                 SELECT id FROM graph_nodes WHERE project_id = ?1 AND file_path = ?2
             )",
            params![project_id, file_path],
        )?;
        Ok(())
    }

    /// Delete edges still marked stale for a file — the second half of
    /// re-extraction, once the fresh edge set has replaced them.
    pub fn delete_stale_edges_for_file(&self, project_id: &str, file_path: &str) -> Result<()> {
        self.writer()?.execute(
            "DELETE FROM graph_edges WHERE project_id = ?1 AND stale_at IS NOT NULL AND from_id IN (
                 SELECT id FROM graph_nodes WHERE project_id = ?1 AND file_path = ?2
             )",
            params![project_id, file_path],
        )?;
        self.writer()?.execute(
            "DELETE FROM graph_nodes WHERE project_id = ?1 AND file_path = ?2 AND stale_at IS NOT NULL",
            params![project_id, file_path],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Closure table (§4.3.1)
    // ------------------------------------------------------------------

    /// Full closure rebuild: recompute every root's reachability and
    /// replace the table wholesale, batching inserts in chunks of 500.
    pub fn rebuild_closure(&self, project_id: &str) -> Result<usize> {
        let edges = self.get_all_edges(project_id)?;
        let entries = closure::rebuild_closure(&edges, self.config.max_closure_depth);
        let conn = self.writer()?;
        conn.execute("DELETE FROM graph_closure", [])?;
        Self::insert_closure_entries(&conn, &entries)?;
        conn.execute(
            "INSERT INTO graph_index_state (project_id, last_full_rebuild_at) VALUES (?1, ?2)
             ON CONFLICT(project_id) DO UPDATE SET last_full_rebuild_at = excluded.last_full_rebuild_at",
            params![project_id, Utc::now().to_rfc3339()],
        )?;
        Ok(entries.len())
    }

    /// Incremental update for one node's closure rows, after its outgoing
    /// edges changed.
    pub fn update_closure_for_node(&self, project_id: &str, node_id: &str) -> Result<usize> {
        let edges = self.get_all_edges(project_id)?;
        let entries = closure::update_closure_for_node(&edges, node_id, self.config.max_closure_depth);
        let conn = self.writer()?;
        conn.execute("DELETE FROM graph_closure WHERE from_id = ?1", params![node_id])?;
        Self::insert_closure_entries(&conn, &entries)?;
        conn.execute(
            "INSERT INTO graph_index_state (project_id, last_incremental_at) VALUES (?1, ?2)
             ON CONFLICT(project_id) DO UPDATE SET last_incremental_at = excluded.last_incremental_at",
            params![project_id, Utc::now().to_rfc3339()],
        )?;
        Ok(entries.len())
    }

    fn insert_closure_entries(conn: &Connection, entries: &[ClosureEntry]) -> Result<()> {
        for chunk in entries.chunks(500) {
            for entry in chunk {
                conn.execute(
                    "INSERT OR REPLACE INTO graph_closure (from_id, to_id, depth, path_edge_id) VALUES (?1,?2,?3,?4)",
                    params![entry.from_id, entry.to_id, entry.depth, entry.path_edge_id],
                )?;
            }
        }
        Ok(())
    }

    pub fn get_descendants(&self, node_id: &str) -> Result<Vec<ClosureEntry>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT from_id, to_id, depth, path_edge_id FROM graph_closure WHERE from_id = ?1")?;
        let rows = stmt.query_map(params![node_id], row_to_closure_entry)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    pub fn get_ancestors(&self, node_id: &str) -> Result<Vec<ClosureEntry>> {
        let conn = self.reader()?;
        let mut stmt = conn.prepare("SELECT from_id, to_id, depth, path_edge_id FROM graph_closure WHERE to_id = ?1")?;
        let rows = stmt.query_map(params![node_id], row_to_closure_entry)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(EngineError::from)
    }

    /// Impact analysis (§4.3.2): pulls the full node/edge/closure/memory
    /// sets for `project_id` and delegates the arithmetic to
    /// [`crate::graph::impact::impact`].
    pub fn impact(&self, project_id: &str, target: &str) -> Result<ImpactResult> {
        let nodes = self.get_all_nodes(project_id)?;
        let edges = self.get_all_edges(project_id)?;
        let closure = {
            let conn = self.reader()?;
            let mut stmt = conn.prepare("SELECT from_id, to_id, depth, path_edge_id FROM graph_closure")?;
            let rows = stmt.query_map([], row_to_closure_entry)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        let memories = self.list_all_memories(project_id)?;
        Ok(impact::impact(target, &nodes, &edges, &closure, &memories))
    }
}

fn scope_as_str(scope: MemoryScope) -> &'static str {
    match scope {
        MemoryScope::Global => "global",
        MemoryScope::Module => "module",
        MemoryScope::WorkUnit => "workunit",
        MemoryScope::Session => "session",
    }
}

fn scope_from_str(s: &str) -> MemoryScope {
    match s {
        "module" => MemoryScope::Module,
        "workunit" => MemoryScope::WorkUnit,
        "session" => MemoryScope::Session,
        _ => MemoryScope::Global,
    }
}

fn source_as_str(source: MemorySource) -> &'static str {
    match source {
        MemorySource::AgentExplicit => "agent_explicit",
        MemorySource::ObserverInferred => "observer_inferred",
        MemorySource::QaAuto => "qa_auto",
        MemorySource::McpAuto => "mcp_auto",
        MemorySource::CommitAuto => "commit_auto",
        MemorySource::UserTaught => "user_taught",
    }
}

fn source_from_str(s: &str) -> MemorySource {
    match s {
        "observer_inferred" => MemorySource::ObserverInferred,
        "qa_auto" => MemorySource::QaAuto,
        "mcp_auto" => MemorySource::McpAuto,
        "commit_auto" => MemorySource::CommitAuto,
        "user_taught" => MemorySource::UserTaught,
        _ => MemorySource::AgentExplicit,
    }
}

fn chunk_kind_as_str(kind: ChunkKind) -> &'static str {
    match kind {
        ChunkKind::Function => "function",
        ChunkKind::Class => "class",
        ChunkKind::Module => "module",
        ChunkKind::Prose => "prose",
    }
}

fn chunk_kind_from_str(s: &str) -> Option<ChunkKind> {
    Some(match s {
        "function" => ChunkKind::Function,
        "class" => ChunkKind::Class,
        "module" => ChunkKind::Module,
        "prose" => ChunkKind::Prose,
        _ => return None,
    })
}

fn node_source_as_str(source: NodeSource) -> &'static str {
    match source {
        NodeSource::Ast => "ast",
        NodeSource::Scip => "scip",
        NodeSource::Llm => "llm",
        NodeSource::Agent => "agent",
    }
}

fn node_confidence_as_str(confidence: NodeConfidence) -> &'static str {
    match confidence {
        NodeConfidence::Confirmed => "confirmed",
        NodeConfidence::Inferred => "inferred",
        NodeConfidence::Speculative => "speculative",
    }
}

fn node_source_from_str(s: &str) -> NodeSource {
    match s {
        "scip" => NodeSource::Scip,
        "llm" => NodeSource::Llm,
        "agent" => NodeSource::Agent,
        _ => NodeSource::Ast,
    }
}

fn node_confidence_from_str(s: &str) -> NodeConfidence {
    match s {
        "inferred" => NodeConfidence::Inferred,
        "speculative" => NodeConfidence::Speculative,
        _ => NodeConfidence::Confirmed,
    }
}

fn layer_from_i32(n: i32) -> Layer {
    match n {
        2 => Layer::Semantic,
        3 => Layer::Knowledge,
        _ => Layer::Structural,
    }
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}

fn row_to_memory(row: &rusqlite::Row<'_>) -> rusqlite::Result<Memory> {
    let kind_str: String = row.get("kind")?;
    let tags: String = row.get("tags")?;
    let related_files: String = row.get("related_files")?;
    let related_modules: String = row.get("related_modules")?;
    let reinforced: String = row.get("reinforced_by_sessions")?;
    let impacted: String = row.get("impacted_node_ids")?;
    let created_at: String = row.get("created_at")?;
    let last_accessed_at: String = row.get("last_accessed_at")?;
    let stale_at: Option<String> = row.get("stale_at")?;
    let chunk_kind: Option<String> = row.get("chunk_kind")?;

    Ok(Memory {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        kind: MemoryKind::parse_name(&kind_str).unwrap_or(MemoryKind::Pattern),
        content: row.get("content")?,
        confidence: row.get("confidence")?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        related_files: serde_json::from_str(&related_files).unwrap_or_default(),
        related_modules: serde_json::from_str(&related_modules).unwrap_or_default(),
        scope: scope_from_str(&row.get::<_, String>("scope")?),
        source: source_from_str(&row.get::<_, String>("source")?),
        created_at: parse_rfc3339(&created_at),
        last_accessed_at: parse_rfc3339(&last_accessed_at),
        access_count: row.get::<_, i64>("access_count")? as u64,
        provenance: Provenance {
            session_id: row.get("session_id").unwrap_or_default(),
            commit_hash: row.get("commit_hash")?,
            reinforced_by_sessions: serde_json::from_str(&reinforced).unwrap_or_default(),
        },
        graph_link: GraphLink {
            target_node_id: row.get("target_node_id")?,
            impacted_node_ids: serde_json::from_str(&impacted).unwrap_or_default(),
        },
        lifecycle: LifecycleFlags {
            needs_review: row.get("needs_review")?,
            user_verified: row.get("user_verified")?,
            pinned: row.get("pinned")?,
            deprecated: row.get("deprecated")?,
            stale_at: stale_at.map(|s| parse_rfc3339(&s)),
        },
        chunk: match chunk_kind {
            Some(k) => Some(ChunkMetadata {
                chunk_kind: chunk_kind_from_str(&k),
                start_line: row.get("chunk_start_line")?,
                end_line: row.get("chunk_end_line")?,
                context_prefix: row.get("chunk_context_prefix")?,
                embedding_model_id: row.get("embedding_model_id")?,
            }),
            None => None,
        },
        embedding_model_id: row.get("embedding_model_id")?,
    })
}

fn row_to_node(row: &rusqlite::Row<'_>) -> rusqlite::Result<GraphNode> {
    let kind_str: String = row.get("kind")?;
    let source_str: String = row.get("source")?;
    let confidence_str: String = row.get("confidence")?;
    let layer_i: i32 = row.get("layer")?;
    let stale_at: Option<String> = row.get("stale_at")?;
    Ok(GraphNode {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        kind: NodeKind::parse(&kind_str).unwrap_or(NodeKind::File),
        label: row.get("label")?,
        file_path: row.get("file_path")?,
        language: row.get("language")?,
        line_start: row.get("line_start")?,
        line_end: row.get("line_end")?,
        layer: layer_from_i32(layer_i),
        source: node_source_from_str(&source_str),
        confidence: node_confidence_from_str(&confidence_str),
        stale_at: stale_at.map(|s| parse_rfc3339(&s)),
    })
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<GraphEdge> {
    let edge_type_str: String = row.get("edge_type")?;
    let stale_at: Option<String> = row.get("stale_at")?;
    Ok(GraphEdge {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        from_id: row.get("from_id")?,
        to_id: row.get("to_id")?,
        edge_type: EdgeType::parse(&edge_type_str).unwrap_or(EdgeType::Imports),
        weight: row.get("weight")?,
        confidence: row.get("confidence")?,
        stale_at: stale_at.map(|s| parse_rfc3339(&s)),
    })
}

fn row_to_closure_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClosureEntry> {
    Ok(ClosureEntry {
        from_id: row.get(0)?,
        to_id: row.get(1)?,
        depth: row.get(2)?,
        path_edge_id: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKind;

    fn temp_storage() -> (Storage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        (Storage::new(Some(path)).unwrap(), dir)
    }

    #[test]
    fn upsert_then_get_memory_round_trips() {
        let (storage, _dir) = temp_storage();
        let memory = Memory::new("proj", MemoryKind::Gotcha, "watch out for X");
        storage.upsert_memory(&memory).unwrap();
        let fetched = storage.get_memory(&memory.id).unwrap().unwrap();
        assert_eq!(fetched.content, "watch out for X");
        assert_eq!(fetched.kind, MemoryKind::Gotcha);
    }

    #[test]
    fn full_text_search_finds_matching_memory() {
        let (storage, _dir) = temp_storage();
        let memory = Memory::new("proj", MemoryKind::Gotcha, "retry loop spins forever on timeout");
        storage.upsert_memory(&memory).unwrap();
        let hits = storage.search_full_text("proj", "timeout", 10).unwrap();
        assert!(hits.iter().any(|(id, _)| id == &memory.id));
    }

    #[test]
    fn graph_node_and_edge_round_trip() {
        let (storage, _dir) = temp_storage();
        let node = GraphNode::new("proj", "a.ts", "a.ts", NodeKind::File);
        storage.upsert_node(&node).unwrap();
        let fetched = storage.get_nodes_by_file("proj", "a.ts").unwrap();
        assert_eq!(fetched.len(), 1);

        let other = GraphNode::new("proj", "b.ts", "b.ts", NodeKind::File);
        storage.upsert_node(&other).unwrap();
        let edge = GraphEdge::new("proj", &node.id, &other.id, EdgeType::Imports);
        storage.upsert_edge(&edge).unwrap();
        assert_eq!(storage.get_edges_from(&node.id).unwrap().len(), 1);
        assert_eq!(storage.get_edges_to(&other.id).unwrap().len(), 1);
    }

    #[test]
    fn rebuild_closure_persists_reachability() {
        let (storage, _dir) = temp_storage();
        let a = GraphNode::new("proj", "a.ts", "a.ts", NodeKind::File);
        let b = GraphNode::new("proj", "b.ts", "b.ts", NodeKind::File);
        storage.upsert_node(&a).unwrap();
        storage.upsert_node(&b).unwrap();
        let edge = GraphEdge::new("proj", &a.id, &b.id, EdgeType::Imports);
        storage.upsert_edge(&edge).unwrap();

        storage.rebuild_closure("proj").unwrap();
        let descendants = storage.get_descendants(&a.id).unwrap();
        assert_eq!(descendants.len(), 1);
        assert_eq!(descendants[0].to_id, b.id);
    }

    #[test]
    fn mark_file_nodes_stale_excludes_from_future_lookups_once_deleted() {
        let (storage, _dir) = temp_storage();
        let node = GraphNode::new("proj", "a.ts", "a.ts", NodeKind::File);
        storage.upsert_node(&node).unwrap();
        storage.mark_file_nodes_stale("proj", "a.ts").unwrap();
        storage.delete_stale_edges_for_file("proj", "a.ts").unwrap();
        assert!(storage.get_nodes_by_file("proj", "a.ts").unwrap().is_empty());
    }
}
