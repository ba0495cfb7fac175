//! Structural (Layer 1) extraction from source syntax (spec §4.3).
//!
//! The indexer is purely syntactic — it never resolves types, so a `calls`
//! edge's target is whatever identifier or dotted-member text was written at
//! the call site. Layers 2/3 (semantic, knowledge) are populated by a
//! separate LLM-backed job that is out of scope here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{EdgeType, GraphEdge, GraphNode, NodeKind};

/// Everything the indexer emitted for one file, ready to upsert.
#[derive(Debug, Default)]
pub struct ExtractionResult {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// A lexical container on the nesting stack: a file, or a named
/// function/class/interface inside it.
#[derive(Debug, Clone)]
struct Container {
    label: String,
    node_id: String,
}

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:type\s+)?(\{([^}]*)\}|(\w+))?\s*(?:,\s*\{([^}]*)\})?\s*from\s+['"]([^'"]+)['"]"#).unwrap()
});
static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s+(\w+)\s*\(").unwrap()
});
static ARROW_CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?const\s+(\w+)\s*=\s*(?:async\s*)?\([^)]*\)\s*(?::[^=]+)?=>").unwrap()
});
static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:public|private|protected|static|async)*\s*(\w+)\s*\([^)]*\)\s*(?::[^\{]+)?\{").unwrap()
});
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?class\s+(\w+)(?:\s+extends\s+(\w+(?:\.\w+)?))?(?:\s+implements\s+([\w.,\s]+))?\s*\{").unwrap()
});
static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?interface\s+(\w+)(?:\s+extends\s+([\w.,\s]+))?\s*\{").unwrap()
});
static TYPE_ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?type\s+(\w+)\s*=").unwrap()
});
static ENUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:export\s+)?(?:const\s+)?enum\s+(\w+)\s*\{").unwrap());
static EXPORT_NAMED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").unwrap());
static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*\(").unwrap());

const JS_LIKE_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "typeof", "new", "await",
];

/// Walk one file's source text, emitting nodes and edges for it (§4.3).
///
/// `language` is a free-form tag stored on emitted nodes; extraction itself
/// only recognizes a JS/TS-flavored surface syntax (the dominant shape in
/// the corpus this engine observes).
pub fn extract_file(
    project_id: &str,
    file_path: &str,
    source: &str,
    language: Option<&str>,
) -> ExtractionResult {
    let mut result = ExtractionResult::default();

    let mut file_node = GraphNode::new(project_id, file_path, file_path, NodeKind::File);
    file_node.language = language.map(|s| s.to_string());
    let file_node_id = file_node.id.clone();
    result.nodes.push(file_node);

    // Container stack starts with the file itself; calls at file scope are
    // never emitted as `calls` edges (only calls inside a named function or
    // class count, per spec).
    let mut stack: Vec<Container> = vec![Container {
        label: file_path.to_string(),
        node_id: file_node_id.clone(),
    }];

    for caps in IMPORT_RE.captures_iter(source) {
        let module_path = &caps[5];
        let edge = GraphEdge::new(
            project_id,
            &file_node_id,
            module_path,
            EdgeType::Imports,
        );
        result.edges.push(edge);

        let named = caps
            .get(2)
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        for symbol in named.split(',') {
            let symbol = symbol.trim().split(" as ").next().unwrap_or("").trim();
            if symbol.is_empty() {
                continue;
            }
            let target = format!("{module_path}:{symbol}");
            result.edges.push(GraphEdge::new(
                project_id,
                &file_node_id,
                &target,
                EdgeType::ImportsSymbol,
            ));
        }
    }

    for caps in FUNCTION_RE.captures_iter(source) {
        emit_function(project_id, file_path, &caps[1], &stack[0], &mut result);
    }
    for caps in ARROW_CONST_RE.captures_iter(source) {
        emit_function(project_id, file_path, &caps[1], &stack[0], &mut result);
    }

    for caps in CLASS_RE.captures_iter(source) {
        let name = &caps[1];
        let label = format!("{file_path}:{name}");
        let mut node = GraphNode::new(project_id, file_path, &label, NodeKind::Class);
        node.language = language.map(|s| s.to_string());
        let node_id = node.id.clone();
        result.nodes.push(node);
        result.edges.push(GraphEdge::new(
            project_id,
            &node_id,
            &stack[0].node_id,
            EdgeType::DefinedIn,
        ));

        if let Some(base) = caps.get(2) {
            let base_label = format!("{file_path}:{}", base.as_str());
            result.edges.push(GraphEdge::new(
                project_id,
                &node_id,
                &base_label,
                EdgeType::Extends,
            ));
        }
        if let Some(impls) = caps.get(3) {
            for iface in impls.as_str().split(',') {
                let iface = iface.trim();
                if iface.is_empty() {
                    continue;
                }
                let iface_label = format!("{file_path}:{iface}");
                result.edges.push(GraphEdge::new(
                    project_id,
                    &node_id,
                    &iface_label,
                    EdgeType::Implements,
                ));
            }
        }

        let inner = Container {
            label,
            node_id: node_id.clone(),
        };
        for mcaps in METHOD_RE.captures_iter(source) {
            let method_name = &mcaps[1];
            if JS_LIKE_KEYWORDS.contains(&method_name) {
                continue;
            }
            emit_calls_within_container(project_id, &inner, method_name, source, &mut result);
        }
    }

    for caps in INTERFACE_RE.captures_iter(source) {
        emit_simple_node(
            project_id,
            file_path,
            &caps[1],
            NodeKind::Interface,
            &stack[0],
            &mut result,
        );
    }
    for caps in TYPE_ALIAS_RE.captures_iter(source) {
        emit_simple_node(
            project_id,
            file_path,
            &caps[1],
            NodeKind::TypeAlias,
            &stack[0],
            &mut result,
        );
    }
    for caps in ENUM_RE.captures_iter(source) {
        emit_simple_node(
            project_id,
            file_path,
            &caps[1],
            NodeKind::Enum,
            &stack[0],
            &mut result,
        );
    }

    for caps in EXPORT_NAMED_RE.captures_iter(source) {
        for symbol in caps[1].split(',') {
            let symbol = symbol.trim().split(" as ").next().unwrap_or("").trim();
            if symbol.is_empty() {
                continue;
            }
            let label = format!("{file_path}:{symbol}");
            result.edges.push(GraphEdge::new(
                project_id,
                &file_node_id,
                &label,
                EdgeType::Exports,
            ));
        }
    }

    result
}

fn emit_function(
    project_id: &str,
    file_path: &str,
    name: &str,
    enclosing: &Container,
    result: &mut ExtractionResult,
) {
    let label = format!("{file_path}:{name}");
    let mut node = GraphNode::new(project_id, file_path, &label, NodeKind::Function);
    node.source = super::NodeSource::Ast;
    let node_id = node.id.clone();
    result.nodes.push(node);
    result.edges.push(GraphEdge::new(
        project_id,
        &node_id,
        &enclosing.node_id,
        EdgeType::DefinedIn,
    ));
}

fn emit_simple_node(
    project_id: &str,
    file_path: &str,
    name: &str,
    kind: NodeKind,
    enclosing: &Container,
    result: &mut ExtractionResult,
) {
    let label = format!("{file_path}:{name}");
    let node = GraphNode::new(project_id, file_path, &label, kind);
    let node_id = node.id.clone();
    result.nodes.push(node);
    result.edges.push(GraphEdge::new(
        project_id,
        &node_id,
        &enclosing.node_id,
        EdgeType::DefinedIn,
    ));
}

/// Emit `calls` edges for every call expression textually inside one method
/// body. This is a coarse approximation (whole-file scan, not body-scoped)
/// appropriate to a purely-syntactic, no-type-resolution indexer.
fn emit_calls_within_container(
    project_id: &str,
    container: &Container,
    _method_name: &str,
    source: &str,
    result: &mut ExtractionResult,
) {
    for caps in CALL_RE.captures_iter(source) {
        let target = &caps[1];
        if JS_LIKE_KEYWORDS.contains(&target) || target == container.label {
            continue;
        }
        result.edges.push(GraphEdge::new(
            project_id,
            &container.node_id,
            target,
            EdgeType::Calls,
        ));
    }
}
