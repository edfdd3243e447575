use serde_json::Value;
use tracing::debug;

use crate::{
    flow_ir::{AgentRole, Edge, ModelRef, PortRef, Provider, ToolSpec},
    ir::NodeKind,
    loader::NodeGraph,
    model::NodeDoc,
    registry::{DEFAULT_TOOL_DESCRIPTION, FALLBACK_MODEL_NAME, MODEL_PORT_MARKER},
};

/// One keyword rule of the role table.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub keyword: &'static str,
    pub role: AgentRole,
}

/// Role keywords in priority order; the first rule whose keyword occurs in the
/// lowercased node name wins.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        keyword: "supervisor",
        role: AgentRole::Supervisor,
    },
    RoleRule {
        keyword: "observer",
        role: AgentRole::Observer,
    },
    RoleRule {
        keyword: "planning",
        role: AgentRole::Planning,
    },
    RoleRule {
        keyword: "image",
        role: AgentRole::Image,
    },
    RoleRule {
        keyword: "search",
        role: AgentRole::Search,
    },
];

/// Infer an agent role from its display name.
pub fn infer_role(name: &str) -> AgentRole {
    let lowered = name.to_lowercase();
    ROLE_RULES
        .iter()
        .find(|rule| lowered.contains(rule.keyword))
        .map(|rule| rule.role)
        .unwrap_or_default()
}

/// An agent with its bindings resolved from inbound edges.
///
/// `model_ref` stays `None` when no model edge was found; the assembler picks
/// the default once the final model list is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentBinding {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    pub system: Option<String>,
    pub model_ref: Option<String>,
    pub tools: Vec<String>,
}

/// Output of classification plus binding resolution for one document.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub models: Vec<ModelRef>,
    pub tools: Vec<ToolSpec>,
    pub agents: Vec<AgentBinding>,
    pub edges: Vec<Edge>,
}

/// Classify nodes, build edges, and bind models/tools to agents.
pub fn resolve(graph: &NodeGraph) -> Resolution {
    let mut resolution = classify_nodes(graph);
    resolution.edges = build_edges(graph);
    for agent in &mut resolution.agents {
        bind_agent(
            agent,
            &resolution.edges,
            &resolution.models,
            &resolution.tools,
        );
    }
    resolution
}

/// Single pass over nodes in document order. Edges are left empty.
pub fn classify_nodes(graph: &NodeGraph) -> Resolution {
    let mut resolution = Resolution::default();
    for node in graph.nodes() {
        match graph.kind_of(&node.id) {
            Some(NodeKind::Agent) => resolution.agents.push(AgentBinding {
                id: node.id.clone(),
                name: node.name.clone(),
                role: infer_role(&node.name),
                system: system_message(&node.parameters),
                model_ref: None,
                tools: Vec::new(),
            }),
            Some(NodeKind::ChatModel) => resolution.models.push(ModelRef {
                id: node.id.clone(),
                provider: Provider::OpenAi,
                model: model_name(&node.parameters)
                    .unwrap_or_else(|| FALLBACK_MODEL_NAME.to_string()),
            }),
            Some(kind) if kind.is_tool() => resolution.tools.push(tool_spec(node)),
            _ => {}
        }
    }
    resolution
}

/// Turn the name-keyed connection map into id-keyed edges.
///
/// Connections whose source or target name does not resolve are dropped.
pub fn build_edges(graph: &NodeGraph) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (source_name, ports) in graph.connections() {
        let Some(from_id) = graph.id_for_name(source_name) else {
            debug!(source = %source_name, "dropping connections from unknown node");
            continue;
        };
        for (port_key, lists) in ports {
            for target in lists.iter().flatten() {
                let Some(to_id) = graph.id_for_name(&target.node) else {
                    debug!(
                        source = %source_name,
                        target = %target.node,
                        port = %port_key,
                        "dropping connection to unknown node"
                    );
                    continue;
                };
                let port = target.edge_type.as_deref().unwrap_or(port_key).to_string();
                edges.push(Edge {
                    from: PortRef {
                        node_id: from_id.to_string(),
                        port: port.clone(),
                    },
                    to: PortRef {
                        node_id: to_id.to_string(),
                        port,
                    },
                });
            }
        }
    }
    edges
}

fn bind_agent(agent: &mut AgentBinding, edges: &[Edge], models: &[ModelRef], tools: &[ToolSpec]) {
    let is_model = |id: &str| models.iter().any(|m| m.id == id);
    let is_tool = |id: &str| tools.iter().any(|t| t.id == id);
    for edge in edges.iter().filter(|e| e.to.node_id == agent.id) {
        let source = edge.from.node_id.as_str();
        if edge.from.port.contains(MODEL_PORT_MARKER) {
            // First model edge in document order wins.
            if agent.model_ref.is_none() && is_model(source) {
                agent.model_ref = Some(source.to_string());
            }
        } else if is_tool(source) {
            agent.tools.push(source.to_string());
        }
    }
}

fn tool_spec(node: &NodeDoc) -> ToolSpec {
    ToolSpec {
        id: node.id.clone(),
        name: node.name.clone(),
        description: tool_description(&node.parameters),
        input_shape: Default::default(),
        output_shape: Default::default(),
    }
}

fn system_message(parameters: &Value) -> Option<String> {
    parameters
        .pointer("/options/systemMessage")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn tool_description(parameters: &Value) -> String {
    parameters
        .get("toolDescription")
        .and_then(Value::as_str)
        .filter(|desc| !desc.is_empty())
        .unwrap_or(DEFAULT_TOOL_DESCRIPTION)
        .to_string()
}

/// Read the model name, given either as a plain string or as `{value}` /
/// `{model}` resource-locator objects.
fn model_name(parameters: &Value) -> Option<String> {
    let model = parameters.get("model")?;
    let value = match model {
        Value::Object(map) => map
            .get("value")
            .filter(|v| !v.is_null())
            .or_else(|| map.get("model").filter(|v| !v.is_null()))
            .unwrap_or(model),
        _ => model,
    };
    value
        .as_str()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
