use indexmap::IndexSet;

use super::Diagnostic;
use crate::flow_ir::Flow;

/// Id-reference checks that a JSON schema cannot express.
#[derive(Clone, Debug, Default)]
pub struct ReferentialRule;

impl ReferentialRule {
    pub fn check<'a>(flow: &Flow, node_ids: impl IntoIterator<Item = &'a str>) -> Vec<Diagnostic> {
        let node_ids: IndexSet<&str> = node_ids.into_iter().collect();
        let model_ids: IndexSet<&str> = flow.models.iter().map(|m| m.id.as_str()).collect();
        let tool_ids: IndexSet<&str> = flow.tools.iter().map(|t| t.id.as_str()).collect();
        let mut diags = Vec::new();

        if flow.models.is_empty() {
            diags.push(
                Diagnostic::error("flow.models.empty", "flow declares no models")
                    .with_path("/models"),
            );
        }

        let mut seen_agents = IndexSet::new();
        for (idx, agent) in flow.agents.iter().enumerate() {
            if !seen_agents.insert(agent.id.as_str()) {
                diags.push(
                    Diagnostic::error(
                        "flow.agent.duplicate",
                        format!("agent id '{}' appears more than once", agent.id),
                    )
                    .with_node(&agent.id)
                    .with_path(format!("/agents/{idx}/id")),
                );
            }
            if !model_ids.contains(agent.model_ref.as_str()) {
                diags.push(
                    Diagnostic::error(
                        "flow.agent.model_ref.unresolved",
                        format!(
                            "agent '{}' references unknown model '{}'",
                            agent.id, agent.model_ref
                        ),
                    )
                    .with_node(&agent.id)
                    .with_path(format!("/agents/{idx}/modelRef")),
                );
            }
            for (tool_idx, tool_id) in agent.tools.iter().enumerate() {
                if !tool_ids.contains(tool_id.as_str()) {
                    diags.push(
                        Diagnostic::error(
                            "flow.agent.tool_ref.unresolved",
                            format!("agent '{}' references unknown tool '{tool_id}'", agent.id),
                        )
                        .with_node(&agent.id)
                        .with_path(format!("/agents/{idx}/tools/{tool_idx}")),
                    );
                }
            }
        }

        for (idx, edge) in flow.edges.iter().enumerate() {
            for (side, end) in [("from", &edge.from), ("to", &edge.to)] {
                if !node_ids.contains(end.node_id.as_str()) {
                    diags.push(
                        Diagnostic::error(
                            "flow.edge.endpoint.unresolved",
                            format!("edge endpoint '{}' is not a node", end.node_id),
                        )
                        .with_node(&end.node_id)
                        .with_path(format!("/edges/{idx}/{side}/nodeId")),
                    );
                }
            }
        }
        diags
    }
}
