use crate::{
    error::Result,
    flow_ir::{AgentSpec, Flow},
    lint::ensure_valid,
    loader::NodeGraph,
    registry::fallback_model,
    resolve::Resolution,
};

/// Assemble the final [`Flow`] from a resolution and re-validate it.
///
/// Injects the fallback model when the document declared none, and points
/// every agent without a model binding at the first model. A validation
/// failure here is a resolver defect and surfaces as
/// [`crate::error::FlowError::InternalInvariant`].
pub fn assemble_flow(graph: &NodeGraph, resolution: Resolution) -> Result<Flow> {
    let Resolution {
        mut models,
        tools,
        agents,
        edges,
    } = resolution;

    if models.is_empty() {
        models.push(fallback_model());
    }
    let default_model = models[0].id.clone();

    let agents = agents
        .into_iter()
        .map(|binding| AgentSpec {
            id: binding.id,
            name: binding.name,
            role: binding.role,
            system: binding.system,
            model_ref: binding.model_ref.unwrap_or_else(|| default_model.clone()),
            tools: binding.tools,
        })
        .collect();

    let flow = Flow {
        models,
        tools,
        agents,
        edges,
    };
    ensure_valid(&flow, graph.node_ids())?;
    Ok(flow)
}
