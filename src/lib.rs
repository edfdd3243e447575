//! Compiles n8n-style agent workflow exports into a typed [`flow_ir::Flow`] and
//! emits generated `config.ts` / `schema.ts` / `index.ts` modules from it.
//!
//! The pipeline runs once per document, strictly forward:
//! [`loader`] → [`resolve`] → [`assemble`] → [`schema_infer`] → [`overrides`] → [`emit`].
//! [`builder`] drives it over a directory of exports.
#![forbid(unsafe_code)]

pub mod assemble;
pub mod builder;
pub mod bundle;
pub mod emit;
pub mod error;
pub mod flow_ir;
pub mod ir;
pub mod lint;
pub mod loader;
pub mod model;
pub mod overrides;
pub mod path_safety;
pub mod registry;
pub mod resolve;
pub mod schema_infer;
pub mod schema_validate;
pub mod util;

pub use bundle::{WorkflowBundle, WorkflowBundleVersion};

use crate::{
    error::Result,
    loader::{NodeGraph, load_workflow_from_str},
    overrides::{OverrideMapping, merge_overrides},
};

/// Compile a workflow document from JSON with no override mapping.
pub fn compile_workflow(json: &str) -> Result<WorkflowBundle> {
    compile_workflow_with_overrides(json, &OverrideMapping::default())
}

/// Compile a workflow document from JSON, applying `overrides` to tool shapes.
pub fn compile_workflow_with_overrides(
    json: &str,
    overrides: &OverrideMapping,
) -> Result<WorkflowBundle> {
    let graph = load_workflow_from_str(json)?;
    compile_graph(&graph, overrides)
}

/// Run resolution, assembly, inference and override merging on a loaded graph.
pub fn compile_graph(graph: &NodeGraph, overrides: &OverrideMapping) -> Result<WorkflowBundle> {
    let resolution = resolve::resolve(graph);
    let flow = assemble::assemble_flow(graph, resolution)?;
    let shapes = schema_infer::infer_tool_shapes(graph, &flow);
    let shapes = merge_overrides(shapes, overrides);
    let flow = flow.with_tool_shapes(shapes);
    Ok(WorkflowBundle::new(graph.id.clone(), graph.name.clone(), flow))
}
