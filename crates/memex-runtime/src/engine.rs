//! Engine and per-session wiring for the Agent Injection Bridge (spec §4.4,
//! §4.6) sitting on top of the storage layer.
//!
//! [`Engine`] owns everything shared across sessions in a project (the
//! store, the config). [`Session`] owns everything scoped to one agent
//! session: the scratchpad, the injection bridge's dedup state, and the
//! translation from wire [`Request`]/[`Response`] messages to memex-core
//! calls.

use std::sync::Arc;

use memex_core::{
    promote, Config, InjectionBridge, Memory, MemoryKind, Scratchpad, SessionType, Storage,
};
use tracing::warn;

use crate::protocol::types::{MemoryEntry, MemoryHit, Request, Response};

pub struct Engine {
    pub storage: Arc<Storage>,
    pub config: Config,
}

impl Engine {
    pub fn new(storage: Arc<Storage>, config: Config) -> Arc<Self> {
        Arc::new(Self { storage, config })
    }
}

/// Per-session state. One instance per connected agent session.
pub struct Session {
    engine: Arc<Engine>,
    project_id: String,
    scratchpad: Scratchpad,
    bridge: InjectionBridge,
}

impl Session {
    pub fn new(
        engine: Arc<Engine>,
        project_id: impl Into<String>,
        session_id: impl Into<String>,
        session_type: SessionType,
    ) -> Self {
        Self {
            engine,
            project_id: project_id.into(),
            scratchpad: Scratchpad::new(session_id, session_type),
            bridge: InjectionBridge::new(),
        }
    }

    /// Dispatch a single inbound wire message. Fire-and-forget requests
    /// return `None`; request/response pairs return `Some`.
    pub async fn handle(&mut self, request: Request) -> Option<Response> {
        match request {
            Request::ToolCall {
                tool_name,
                args,
                step_number,
            } => {
                self.observe_tool_call(&tool_name, &args, step_number);
                None
            }
            Request::ToolResult { .. } => None,
            Request::Reasoning { text, .. } => {
                self.scratchpad.add_tokens((text.len() / 4) as u64);
                None
            }
            Request::StepComplete { .. } => None,
            Request::MemorySearch { request_id, filters } => {
                Some(self.memory_search(request_id, filters))
            }
            Request::MemoryRecord { request_id, entry } => {
                Some(self.memory_record(request_id, entry))
            }
            Request::MemoryStepInject {
                request_id,
                step_number,
                recent_context,
            } => Some(self.memory_step_inject(request_id, step_number, recent_context)),
        }
    }

    fn observe_tool_call(&mut self, tool_name: &str, args: &serde_json::Value, step: u64) {
        self.scratchpad.record_tool_call(tool_name, step);

        let path = args.get("path").or(args.get("file_path")).and_then(|v| v.as_str());

        match tool_name {
            "Read" | "Edit" | "Write" => {
                if let Some(path) = path {
                    self.scratchpad.record_file_access(path, step);
                    if tool_name != "Read" {
                        self.scratchpad.record_edit(path);
                    }
                }
            }
            "Grep" | "Glob" => {
                if let Some(pattern) = args.get("pattern").and_then(|v| v.as_str()) {
                    self.scratchpad.record_grep(pattern);
                }
            }
            _ => {}
        }

        if let Some(path) = path {
            if path.ends_with(".toml") || path.ends_with(".env") || path.ends_with(".yaml") || path.ends_with(".yml") {
                self.scratchpad.record_config_touch(path);
            }
        }
    }

    fn memory_search(&self, request_id: String, filters: crate::protocol::types::SearchFilters) -> Response {
        let query = filters.query.unwrap_or_default();
        let limit = filters.limit.unwrap_or(10);

        match self.engine.storage.search_full_text(&self.project_id, &query, limit) {
            Ok(hits) => {
                let results = hits
                    .into_iter()
                    .filter_map(|(id, score)| {
                        let memory = self.engine.storage.get_memory(&id).ok().flatten()?;
                        Some(MemoryHit {
                            id: memory.id,
                            kind: memory.kind.as_str().to_string(),
                            content: memory.content,
                            tags: memory.tags,
                            score,
                        })
                    })
                    .collect();
                Response::MemorySearchResult { request_id, results }
            }
            Err(e) => Response::MemoryError {
                request_id,
                message: e.to_string(),
            },
        }
    }

    fn memory_record(&self, request_id: String, entry: MemoryEntry) -> Response {
        let kind = match MemoryKind::parse_name(&entry.kind) {
            Some(k) => k,
            None => {
                return Response::MemoryError {
                    request_id,
                    message: format!("unknown memory kind: {}", entry.kind),
                }
            }
        };

        let mut memory = Memory::new(&self.project_id, kind, entry.content);
        memory.tags = entry.tags;
        memory.related_files = entry.related_files;
        if let Some(confidence) = entry.confidence {
            memory.confidence = confidence as f64;
        }

        match self.engine.storage.upsert_memory(&memory) {
            Ok(()) => Response::MemoryStored {
                request_id,
                id: memory.id,
            },
            Err(e) => Response::MemoryError {
                request_id,
                message: e.to_string(),
            },
        }
    }

    /// §4.6: evaluate the three injection triggers in order for this step.
    fn memory_step_inject(
        &mut self,
        request_id: String,
        step_number: u64,
        recent_context: Vec<String>,
    ) -> Response {
        let gotcha_candidates = self.gotcha_candidates(&recent_context);
        let reflection_candidate = self.reflection_candidate();
        let search_answer = self.search_short_circuit_answer();

        let injection = self.bridge.evaluate(
            step_number,
            &gotcha_candidates,
            reflection_candidate.as_ref(),
            search_answer.as_ref(),
        );

        let results = injection
            .into_iter()
            .map(|inj| MemoryHit {
                id: inj.memory_id,
                kind: format!("{:?}", inj.trigger),
                content: inj.content,
                tags: Vec::new(),
                score: 1.0,
            })
            .collect();

        Response::MemorySearchResult { request_id, results }
    }

    fn gotcha_candidates(&self, recent_context: &[String]) -> Vec<Memory> {
        const MIN_CONFIDENCE: f64 = 0.65;
        const MAX_RESULTS: usize = 4;

        let kinds = [MemoryKind::Gotcha, MemoryKind::ErrorPattern, MemoryKind::DeadEnd];
        let mut found = Vec::new();
        for kind in kinds {
            let memories = match self.engine.storage.list_memories_by_kind(&self.project_id, kind) {
                Ok(m) => m,
                Err(e) => {
                    warn!("gotcha lookup failed for {kind:?}: {e}");
                    continue;
                }
            };
            for memory in memories {
                if memory.confidence < MIN_CONFIDENCE || self.bridge.has_injected(&memory.id) {
                    continue;
                }
                let touches_context = memory
                    .related_files
                    .iter()
                    .any(|f| recent_context.iter().any(|ctx| ctx.contains(f.as_str())));
                if touches_context {
                    found.push(memory);
                }
                if found.len() >= MAX_RESULTS {
                    return found;
                }
            }
        }
        found
    }

    fn reflection_candidate(&self) -> Option<Memory> {
        let candidate = self.scratchpad.acute_candidates().first()?;
        let mut memory = Memory::new(
            &self.project_id,
            MemoryKind::Pattern,
            format!("You recently noted: {}", candidate.signal.evidence),
        );
        memory.id = format!("scratchpad-reflection-{}", candidate.signal.key);
        Some(memory)
    }

    fn search_short_circuit_answer(&self) -> Option<Memory> {
        let (pattern, _) = self
            .scratchpad
            .grep_counts()
            .iter()
            .max_by_key(|(_, count)| **count)?;
        let hits = self
            .engine
            .storage
            .search_full_text(&self.project_id, pattern, 1)
            .ok()?;
        let (id, _) = hits.into_iter().next()?;
        self.engine.storage.get_memory(&id).ok().flatten()
    }

    /// Finalize the session: turn the scratchpad into candidates and run
    /// them through the promotion pipeline (§4.4.4).
    pub fn finalize(&self) -> Vec<Memory> {
        let existing_confidence = |_key: &str| None;
        let candidates = promote(
            &self.project_id,
            &self.scratchpad,
            self.scratchpad.session_type,
            &self.engine.config,
            existing_confidence,
        );
        candidates.into_iter().map(|c| c.memory).collect()
    }
}
