use serde_json::Value;

use crate::{
    flow_ir::{FieldKind, Flow, Shape, ToolShape, ToolShapes},
    ir::NodeKind,
    loader::NodeGraph,
};

/// Infer input/output shapes for every tool in `flow`.
///
/// Shapes come from the originating node's parameters; output shapes always
/// start empty and can only be filled by an override mapping.
pub fn infer_tool_shapes(graph: &NodeGraph, flow: &Flow) -> ToolShapes {
    flow.tools
        .iter()
        .filter_map(|tool| {
            let node = graph.node(&tool.id)?;
            let kind = graph.kind_of(&tool.id)?;
            Some((
                tool.id.clone(),
                ToolShape {
                    input: infer_input_shape(kind, &node.parameters),
                    output: Shape::new(),
                },
            ))
        })
        .collect()
}

/// Input shape of a single node, by kind.
pub fn infer_input_shape(kind: &NodeKind, parameters: &Value) -> Shape {
    match kind {
        NodeKind::AgentTool => agent_tool_shape(parameters),
        NodeKind::HttpRequestTool => http_request_shape(parameters),
        _ => Shape::new(),
    }
}

fn agent_tool_shape(parameters: &Value) -> Shape {
    let mut shape = Shape::new();
    if parameters.get("text").is_some_and(is_truthy) {
        shape.insert("text".to_string(), FieldKind::String);
    }
    shape
}

fn http_request_shape(parameters: &Value) -> Shape {
    let mut shape = Shape::new();
    let typed_fields: [(&str, fn(&Value) -> bool, FieldKind); 4] = [
        ("url", Value::is_string, FieldKind::String),
        ("method", Value::is_string, FieldKind::String),
        ("sendQuery", Value::is_boolean, FieldKind::Boolean),
        ("sendBody", Value::is_boolean, FieldKind::Boolean),
    ];
    for (field, has_type, kind) in typed_fields {
        if parameters.get(field).is_some_and(has_type) {
            shape.insert(field.to_string(), kind);
        }
    }
    for list in ["/queryParameters/parameters", "/bodyParameters/parameters"] {
        let names = parameters
            .pointer(list)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str));
        for name in names {
            shape.insert(name.to_string(), FieldKind::String);
        }
    }
    shape
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
