//! Knowledge Graph — structural dependency graph over files, functions,
//! classes and interfaces (spec §3.2, §3.3, §4.3).
//!
//! Three sub-modules do the real work:
//! - [`indexer`] extracts Layer-1 (structural) facts from source syntax.
//! - [`closure`] maintains the pre-computed transitive-closure table.
//! - [`impact`] answers "what depends on this?" off the closure table.

pub mod closure;
pub mod impact;
pub mod indexer;

use sha2::{Digest, Sha256};

/// A code entity (spec §3.2).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub project_id: String,
    pub kind: NodeKind,
    pub label: String,
    pub file_path: Option<String>,
    pub language: Option<String>,
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,
    pub layer: Layer,
    pub source: NodeSource,
    pub confidence: NodeConfidence,
    pub stale_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Function,
    Class,
    Interface,
    TypeAlias,
    Variable,
    Enum,
    Module,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Function => "function",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::TypeAlias => "type_alias",
            NodeKind::Variable => "variable",
            NodeKind::Enum => "enum",
            NodeKind::Module => "module",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "file" => NodeKind::File,
            "function" => NodeKind::Function,
            "class" => NodeKind::Class,
            "interface" => NodeKind::Interface,
            "type_alias" => NodeKind::TypeAlias,
            "variable" => NodeKind::Variable,
            "enum" => NodeKind::Enum,
            "module" => NodeKind::Module,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Structural facts straight off the syntax tree.
    Structural = 1,
    /// LLM-derived semantic facts (out of scope here; populated by a
    /// separate asynchronous job).
    Semantic = 2,
    /// Curated knowledge facts (also out of scope here).
    Knowledge = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSource {
    Ast,
    Scip,
    Llm,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeConfidence {
    Confirmed,
    Inferred,
    Speculative,
}

/// A relationship between two nodes (spec §3.2).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub project_id: String,
    pub from_id: String,
    pub to_id: String,
    pub edge_type: EdgeType,
    pub weight: f64,
    pub confidence: f64,
    pub stale_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Imports,
    ImportsSymbol,
    Calls,
    Extends,
    Implements,
    Exports,
    DefinedIn,
}

impl EdgeType {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Imports => "imports",
            EdgeType::ImportsSymbol => "imports_symbol",
            EdgeType::Calls => "calls",
            EdgeType::Extends => "extends",
            EdgeType::Implements => "implements",
            EdgeType::Exports => "exports",
            EdgeType::DefinedIn => "defined_in",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "imports" => EdgeType::Imports,
            "imports_symbol" => EdgeType::ImportsSymbol,
            "calls" => EdgeType::Calls,
            "extends" => EdgeType::Extends,
            "implements" => EdgeType::Implements,
            "exports" => EdgeType::Exports,
            "defined_in" => EdgeType::DefinedIn,
            _ => return None,
        })
    }
}

/// Deterministic id derivation (invariant I6): a pure function of the
/// identifying tuple, first 128 bits of SHA-256, hex-encoded.
fn deterministic_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b":");
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

impl GraphNode {
    /// `id` is a pure function of `project_id:file_path:label:kind` (§3.2).
    pub fn id_for(project_id: &str, file_path: &str, label: &str, kind: NodeKind) -> String {
        deterministic_id(&[project_id, file_path, label, kind.as_str()])
    }

    pub fn new(
        project_id: impl Into<String>,
        file_path: impl Into<String>,
        label: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        let project_id = project_id.into();
        let file_path = file_path.into();
        let label = label.into();
        let id = GraphNode::id_for(&project_id, &file_path, &label, kind);
        Self {
            id,
            project_id,
            kind,
            label,
            file_path: Some(file_path),
            language: None,
            line_start: None,
            line_end: None,
            layer: Layer::Structural,
            source: NodeSource::Ast,
            confidence: NodeConfidence::Confirmed,
            stale_at: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale_at.is_some()
    }
}

impl GraphEdge {
    /// `id` is a pure function of `project_id:from:to:type` (§3.2).
    pub fn id_for(project_id: &str, from_id: &str, to_id: &str, edge_type: EdgeType) -> String {
        deterministic_id(&[project_id, from_id, to_id, edge_type.as_str()])
    }

    pub fn new(
        project_id: impl Into<String>,
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        edge_type: EdgeType,
    ) -> Self {
        let project_id = project_id.into();
        let from_id = from_id.into();
        let to_id = to_id.into();
        let id = GraphEdge::id_for(&project_id, &from_id, &to_id, edge_type);
        Self {
            id,
            project_id,
            from_id,
            to_id,
            edge_type,
            weight: 1.0,
            confidence: 1.0,
            stale_at: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_deterministic_and_reproduction_upserts() {
        let a = GraphNode::id_for("proj", "src/a.rs", "src/a.rs:foo", NodeKind::Function);
        let b = GraphNode::id_for("proj", "src/a.rs", "src/a.rs:foo", NodeKind::Function);
        assert_eq!(a, b);
    }

    #[test]
    fn node_id_changes_with_any_key_component() {
        let a = GraphNode::id_for("proj", "src/a.rs", "src/a.rs:foo", NodeKind::Function);
        let b = GraphNode::id_for("proj", "src/a.rs", "src/a.rs:bar", NodeKind::Function);
        assert_ne!(a, b);
    }

    #[test]
    fn edge_id_is_deterministic() {
        let a = GraphEdge::id_for("proj", "n1", "n2", EdgeType::Calls);
        let b = GraphEdge::id_for("proj", "n1", "n2", EdgeType::Calls);
        assert_eq!(a, b);
    }
}
