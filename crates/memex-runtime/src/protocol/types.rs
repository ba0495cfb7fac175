//! Wire types for the duplex message channel (spec §6.1).
//!
//! A single channel carries tagged-union request and response messages
//! between the agent runtime and the memory engine. Fire-and-forget
//! requests (`tool_call`, `tool_result`, `reasoning`, `step_complete`) have
//! no response. Requests that expect a reply (`memory_search`,
//! `memory_record`, `memory_step_inject`) carry a `request_id` that the
//! matching response echoes.

use serde::{Deserialize, Serialize};

/// A single inbound message from the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    ToolCall {
        tool_name: String,
        args: serde_json::Value,
        step_number: u64,
    },
    ToolResult {
        tool_name: String,
        result: serde_json::Value,
        step_number: u64,
    },
    Reasoning {
        text: String,
        step_number: u64,
    },
    StepComplete {
        step_number: u64,
    },
    MemorySearch {
        request_id: String,
        filters: SearchFilters,
    },
    MemoryRecord {
        request_id: String,
        entry: MemoryEntry,
    },
    MemoryStepInject {
        request_id: String,
        step_number: u64,
        recent_context: Vec<String>,
    },
}

/// Filters accepted by a `memory_search` request. All fields optional;
/// absent filters are unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub kinds: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub related_files: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub phase: Option<String>,
}

/// A caller-supplied memory to persist via `memory_record`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub kind: String,
    pub content: String,
    pub tags: Vec<String>,
    pub related_files: Vec<String>,
    pub confidence: Option<f32>,
}

/// A single retrieved memory as transmitted over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHit {
    pub id: String,
    pub kind: String,
    pub content: String,
    pub tags: Vec<String>,
    pub score: f32,
}

/// Every outbound message, keyed by the request it answers (if any).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    MemorySearchResult {
        request_id: String,
        results: Vec<MemoryHit>,
    },
    MemoryStored {
        request_id: String,
        id: String,
    },
    MemoryError {
        request_id: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_round_trips_through_json() {
        let req = Request::ToolCall {
            tool_name: "Read".to_string(),
            args: serde_json::json!({"path": "src/lib.rs"}),
            step_number: 3,
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        match back {
            Request::ToolCall { step_number, .. } => assert_eq!(step_number, 3),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn memory_search_request_carries_correlation_id() {
        let raw = r#"{"type":"memory_search","request_id":"abc-1","filters":{}}"#;
        let req: Request = serde_json::from_str(raw).unwrap();
        match req {
            Request::MemorySearch { request_id, .. } => assert_eq!(request_id, "abc-1"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
