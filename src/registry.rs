use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    flow_ir::{ModelRef, Provider},
    ir::{AGENT_TOOL_TYPE, AGENT_TYPE, CHAT_MODEL_TYPE, HTTP_REQUEST_TOOL_TYPE, NodeKind},
    loader::NodeGraph,
};

/// Substring of a port label that marks an edge as supplying a language model.
pub const MODEL_PORT_MARKER: &str = "ai_languageModel";
pub const FALLBACK_MODEL_ID: &str = "openai-default";
pub const FALLBACK_MODEL_NAME: &str = "gpt-4.1-mini";
pub const DEFAULT_TOOL_DESCRIPTION: &str = "Tool generated from n8n node";
/// Suffix of the optional override document next to a workflow export.
pub const OVERRIDE_SUFFIX: &str = ".map.json";

/// The model injected when a document declares no chat model.
pub fn fallback_model() -> ModelRef {
    ModelRef {
        id: FALLBACK_MODEL_ID.to_string(),
        provider: Provider::OpenAi,
        model: FALLBACK_MODEL_NAME.to_string(),
    }
}

/// Node types the compiler fully understands.
pub fn supported_node_kinds() -> &'static [&'static str] {
    &[
        AGENT_TYPE,
        AGENT_TOOL_TYPE,
        CHAT_MODEL_TYPE,
        HTTP_REQUEST_TOOL_TYPE,
    ]
}

/// Known model names per provider.
pub fn default_model_presets() -> IndexMap<Provider, Vec<&'static str>> {
    let mut presets = IndexMap::new();
    presets.insert(Provider::OpenAi, vec![FALLBACK_MODEL_NAME]);
    presets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
    Yes,
    No,
    Maybe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportMatrixItem {
    pub node_id: String,
    pub status: SupportStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportMatrix {
    pub nodes: Vec<SupportMatrixItem>,
}

impl SupportMatrix {
    pub fn unsupported(&self) -> impl Iterator<Item = &SupportMatrixItem> {
        self.nodes
            .iter()
            .filter(|item| item.status != SupportStatus::Yes)
    }
}

/// Report how well each node of a graph is understood by the compiler.
pub fn support_matrix(graph: &NodeGraph) -> SupportMatrix {
    let supported = supported_node_kinds();
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| {
            let kind = graph
                .kind_of(&node.id)
                .cloned()
                .unwrap_or_else(|| NodeKind::Other(node.node_type.clone()));
            let (status, reasons) = if supported.contains(&kind.type_tag()) {
                (SupportStatus::Yes, Vec::new())
            } else if kind.is_tool() {
                (
                    SupportStatus::Maybe,
                    vec![format!(
                        "'{}' is exposed as a tool without an inferred input shape",
                        node.node_type
                    )],
                )
            } else {
                (
                    SupportStatus::No,
                    vec![format!("'{}' is ignored by the compiler", node.node_type)],
                )
            };
            SupportMatrixItem {
                node_id: node.id.clone(),
                status,
                reasons,
            }
        })
        .collect();
    SupportMatrix { nodes }
}
