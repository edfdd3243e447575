use crate::{
    error::{FlowError, FlowErrorLocation, Result, SchemaErrorDetail},
    ir::{NodeKind, classify_node_type},
    model::{ConnectionMap, ConnectionTarget, NodeDoc, WorkflowDoc},
};
use indexmap::IndexMap;
use serde_json::Value;
use std::{fs, path::Path};

const INLINE_SOURCE: &str = "<inline>";
const WORKFLOW_SCHEMA_LABEL: &str = "<embedded workflow schema>";
const WORKFLOW_SCHEMA: &str = include_str!("../schemas/workflow.schema.json");

/// A validated workflow document with the lookup indices the resolver needs.
///
/// Connections reference nodes by display name while everything downstream
/// references them by id, so both directions are indexed here once.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    pub id: String,
    pub name: String,
    nodes: Vec<NodeDoc>,
    name_to_id: IndexMap<String, String>,
    id_to_kind: IndexMap<String, NodeKind>,
    id_to_node: IndexMap<String, usize>,
    connections: ConnectionMap,
}

impl NodeGraph {
    /// Nodes in document order.
    pub fn nodes(&self) -> &[NodeDoc] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&NodeDoc> {
        self.id_to_node.get(id).map(|idx| &self.nodes[*idx])
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn kind_of(&self, id: &str) -> Option<&NodeKind> {
        self.id_to_kind.get(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_to_node.contains_key(id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.id_to_node.keys().map(String::as_str)
    }

    pub fn connections(&self) -> &ConnectionMap {
        &self.connections
    }
}

/// Load a workflow document from a JSON string.
pub fn load_workflow_from_str(json: &str) -> Result<NodeGraph> {
    load_workflow_with_source(json, INLINE_SOURCE, None)
}

/// Load a workflow document from a file on disk.
pub fn load_workflow_from_path(path: &Path) -> Result<NodeGraph> {
    let content = fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
    load_workflow_with_source(&content, path.display().to_string(), Some(path))
}

pub(crate) fn load_workflow_with_source(
    json: &str,
    source_label: impl Into<String>,
    source_path: Option<&Path>,
) -> Result<NodeGraph> {
    let source_label = source_label.into();
    let raw: Value = serde_json::from_str(json).map_err(|e| FlowError::Json {
        message: e.to_string(),
        location: json_error_location(&source_label, source_path, &e),
    })?;
    validate_json(&raw, &source_label, source_path)?;

    // Deserialize from text, not from `raw`, so connection maps keep document order.
    let doc: WorkflowDoc = serde_json::from_str(json).map_err(|e| FlowError::Json {
        message: e.to_string(),
        location: json_error_location(&source_label, source_path, &e),
    })?;
    build_graph(doc, &source_label, source_path)
}

fn build_graph(
    doc: WorkflowDoc,
    source_label: &str,
    source_path: Option<&Path>,
) -> Result<NodeGraph> {
    let mut name_to_id = IndexMap::new();
    let mut id_to_kind = IndexMap::new();
    let mut id_to_node = IndexMap::new();
    for (idx, node) in doc.nodes.iter().enumerate() {
        if id_to_node.insert(node.id.clone(), idx).is_some() {
            let pointer = format!("/nodes/{idx}/id");
            let message = format!("duplicate node id '{}'", node.id);
            let location = FlowErrorLocation::at_path(format!("{source_label}{pointer}"))
                .with_source_path(source_path)
                .with_json_pointer(Some(pointer));
            return Err(FlowError::Schema {
                message: format!("{location}: {message}"),
                details: vec![SchemaErrorDetail {
                    message,
                    location: location.clone(),
                }],
                location,
            });
        }
        // Later nodes shadow earlier ones with the same display name.
        name_to_id.insert(node.name.clone(), node.id.clone());
        id_to_kind.insert(node.id.clone(), classify_node_type(&node.node_type));
    }

    let connections = normalize_connections(doc.connections);
    Ok(NodeGraph {
        id: doc.id,
        name: doc.name,
        nodes: doc.nodes,
        name_to_id,
        id_to_kind,
        id_to_node,
        connections,
    })
}

/// Normalize raw port values into typed target lists.
///
/// Anything that does not have the `[[{node, type?, index?}]]` shape is skipped
/// rather than rejected: partially exported documents still compile.
fn normalize_connections(raw: IndexMap<String, IndexMap<String, Value>>) -> ConnectionMap {
    let mut out = ConnectionMap::new();
    for (source, ports) in raw {
        let mut typed_ports = IndexMap::new();
        for (port, lists) in ports {
            let Value::Array(lists) = lists else {
                continue;
            };
            let typed_lists = lists
                .iter()
                .filter_map(Value::as_array)
                .map(|entries| entries.iter().filter_map(parse_target).collect())
                .collect();
            typed_ports.insert(port, typed_lists);
        }
        out.insert(source, typed_ports);
    }
    out
}

fn parse_target(entry: &Value) -> Option<ConnectionTarget> {
    let node = entry.get("node")?.as_str()?.to_string();
    let edge_type = entry
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let index = entry.get("index").and_then(Value::as_u64);
    Some(ConnectionTarget {
        node,
        edge_type,
        index,
    })
}

fn validate_json(doc: &Value, source_label: &str, source_path: Option<&Path>) -> Result<()> {
    let details = crate::schema_validate::validate_against(
        doc,
        WORKFLOW_SCHEMA,
        WORKFLOW_SCHEMA_LABEL,
    )?
    .into_iter()
    .map(|violation| SchemaErrorDetail {
        message: violation.message,
        location: FlowErrorLocation::at_path(format!("{source_label}{}", violation.pointer))
            .with_source_path(source_path)
            .with_json_pointer(Some(violation.pointer)),
    })
    .collect::<Vec<_>>();
    if details.is_empty() {
        return Ok(());
    }
    let message = details
        .iter()
        .map(|detail| {
            let where_str = detail
                .location
                .describe()
                .unwrap_or_else(|| source_label.to_string());
            format!("{where_str}: {}", detail.message)
        })
        .collect::<Vec<_>>()
        .join("\n");
    Err(FlowError::Schema {
        message,
        details,
        location: FlowErrorLocation::at_path(source_label.to_string())
            .with_source_path(source_path),
    })
}

pub(crate) fn json_error_location(
    source_label: &str,
    source_path: Option<&Path>,
    err: &serde_json::Error,
) -> FlowErrorLocation {
    FlowErrorLocation::at_path_with_position(
        source_label.to_string(),
        Some(err.line()),
        Some(err.column()),
    )
    .with_source_path(source_path)
}
