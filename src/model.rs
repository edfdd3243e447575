use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_parameters() -> Value {
    Value::Object(Default::default())
}

fn default_type_version() -> f64 {
    1.0
}

/// Envelope of an exported workflow document.
///
/// Only the fields the compiler reads are typed; node parameters stay an
/// unstructured [`Value`] and are interpreted per node kind during
/// classification. Connections are raw per port and normalized by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDoc {
    pub id: String,
    pub name: String,
    pub nodes: Vec<NodeDoc>,
    pub connections: IndexMap<String, IndexMap<String, Value>>,
    #[serde(default)]
    pub pin_data: Option<Value>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub tags: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDoc {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default = "default_type_version")]
    pub type_version: f64,
    pub position: (f64, f64),
    #[serde(default = "default_parameters")]
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
}

/// One target of a named output port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub node: String,
    pub edge_type: Option<String>,
    pub index: Option<u64>,
}

/// source node name -> port key -> list of target lists.
pub type ConnectionMap = IndexMap<String, IndexMap<String, Vec<Vec<ConnectionTarget>>>>;
