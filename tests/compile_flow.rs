use agent_flow::{
    compile_workflow,
    flow_ir::{AgentRole, Provider},
    lint::validate_flow,
    loader::load_workflow_from_str,
    registry::{DEFAULT_TOOL_DESCRIPTION, FALLBACK_MODEL_ID, FALLBACK_MODEL_NAME},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;

fn fixture(path: &str) -> String {
    fs::read_to_string(path).unwrap()
}

fn node(id: &str, name: &str, node_type: &str, parameters: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": node_type,
        "typeVersion": 1,
        "position": [0, 0],
        "parameters": parameters,
    })
}

fn workflow(nodes: Vec<Value>, connections: Value) -> String {
    json!({"id": "wf", "name": "Workflow", "nodes": nodes, "connections": connections}).to_string()
}

#[test]
fn supervisor_fixture_compiles() {
    let bundle = compile_workflow(&fixture("fixtures/project/supervisor.json")).unwrap();
    assert_eq!(bundle.id, "supervisorFlow01");
    assert_eq!(bundle.name, "Smart Supervisor Assistant");

    let flow = bundle.flow();
    assert_eq!(flow.models.len(), 1);
    assert_eq!(flow.models[0].id, "model-1");
    assert_eq!(flow.models[0].provider, Provider::OpenAi);
    assert_eq!(flow.models[0].model, "gpt-4.1-mini");

    let tool_ids: Vec<_> = flow.tools.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        tool_ids,
        vec!["trigger-1", "memory-1", "observer-tool", "9search"]
    );
    assert_eq!(flow.tools[0].description, DEFAULT_TOOL_DESCRIPTION);
    assert_eq!(
        flow.tool("observer-tool").unwrap().description,
        "Detects content creation intent."
    );

    assert_eq!(flow.agents.len(), 1);
    let agent = &flow.agents[0];
    assert_eq!(agent.id, "agent-1");
    assert_eq!(agent.role, AgentRole::Supervisor);
    assert_eq!(agent.model_ref, "model-1");
    assert_eq!(agent.system.as_deref(), Some("You coordinate helper agents."));
    assert_eq!(
        agent.tools,
        vec!["trigger-1", "memory-1", "observer-tool", "9search"]
    );

    // The edge to "Missing Node" does not resolve and is dropped.
    assert_eq!(flow.edges.len(), 5);
    assert!(flow.edges.iter().all(|e| e.to.node_id == "agent-1"));
    assert_eq!(flow.edges[1].from.port, "ai_languageModel");
}

#[test]
fn fixture_flow_is_referentially_closed() {
    let text = fixture("fixtures/project/supervisor.json");
    let graph = load_workflow_from_str(&text).unwrap();
    let bundle = compile_workflow(&text).unwrap();
    let flow = bundle.flow();
    for agent in &flow.agents {
        assert!(flow.model(&agent.model_ref).is_some());
        for tool in &agent.tools {
            assert!(flow.tool(tool).is_some(), "{tool}");
        }
    }
    for edge in &flow.edges {
        assert!(graph.contains_id(&edge.from.node_id));
        assert!(graph.contains_id(&edge.to.node_id));
    }
    let report = validate_flow(flow, graph.node_ids()).unwrap();
    assert!(report.ok, "{:?}", report.diagnostics);
}

#[test]
fn agent_without_models_gets_fallback() {
    let bundle = compile_workflow(&fixture("fixtures/no_models.json")).unwrap();
    let flow = bundle.flow();
    assert_eq!(flow.models.len(), 1);
    assert_eq!(flow.models[0].id, FALLBACK_MODEL_ID);
    assert_eq!(flow.models[0].model, FALLBACK_MODEL_NAME);
    assert_eq!(flow.agents[0].role, AgentRole::Content);
    assert_eq!(flow.agents[0].model_ref, FALLBACK_MODEL_ID);
    assert!(flow.agents[0].tools.is_empty());
    assert!(flow.tools.is_empty());
    assert!(flow.edges.is_empty());
}

#[test]
fn supervisor_binds_model_and_http_tool() {
    let text = workflow(
        vec![
            node("agent", "Supervisor Agent", "@n8n/n8n-nodes-langchain.agent", json!({})),
            node(
                "model",
                "Model",
                "@n8n/n8n-nodes-langchain.lmChatOpenAi",
                json!({"model": "gpt-4o"}),
            ),
            node(
                "http",
                "Fetch",
                "n8n-nodes-base.httpRequestTool",
                json!({"url": "https://example.com"}),
            ),
        ],
        json!({
            "Model": {"ai_languageModel": [[{"node": "Supervisor Agent", "type": "ai_languageModel", "index": 0}]]},
            "Fetch": {"ai_tool": [[{"node": "Supervisor Agent", "type": "ai_tool", "index": 0}]]}
        }),
    );
    let flow = compile_workflow(&text).unwrap().into_flow();
    assert_eq!(
        (flow.agents.len(), flow.models.len(), flow.tools.len()),
        (1, 1, 1)
    );
    assert_eq!(flow.agents[0].role, AgentRole::Supervisor);
    assert_eq!(flow.agents[0].model_ref, "model");
    assert_eq!(flow.agents[0].tools, vec!["http"]);
    assert_eq!(flow.models[0].model, "gpt-4o");
}

#[test]
fn model_count_is_at_least_one() {
    for declared in 0..4 {
        let mut nodes = vec![node(
            "agent",
            "Planning Agent",
            "@n8n/n8n-nodes-langchain.agent",
            json!({}),
        )];
        for i in 0..declared {
            nodes.push(node(
                &format!("m{i}"),
                &format!("Model {i}"),
                "@n8n/n8n-nodes-langchain.lmChatOpenAi",
                json!({"model": {"value": "gpt-4.1"}}),
            ));
        }
        let flow = compile_workflow(&workflow(nodes, json!({})))
            .unwrap()
            .into_flow();
        assert_eq!(flow.models.len(), declared.max(1), "declared {declared}");
        assert_eq!(flow.agents[0].role, AgentRole::Planning);
        assert_eq!(flow.agents[0].model_ref, flow.models[0].id);
    }
}

#[test]
fn first_model_edge_wins() {
    // Raw text: the tie-break follows connection order as written.
    let text = r#"{
        "id": "wf",
        "name": "Workflow",
        "nodes": [
            {"id": "agent", "name": "Image Agent", "type": "@n8n/n8n-nodes-langchain.agent", "position": [0, 0]},
            {"id": "m1", "name": "First", "type": "@n8n/n8n-nodes-langchain.lmChatOpenAi", "position": [0, 0]},
            {"id": "m2", "name": "Second", "type": "@n8n/n8n-nodes-langchain.lmChatOpenAi", "position": [0, 0]}
        ],
        "connections": {
            "Second": {"ai_languageModel": [[{"node": "Image Agent", "type": "ai_languageModel", "index": 0}]]},
            "First": {"ai_languageModel": [[{"node": "Image Agent", "type": "ai_languageModel", "index": 0}]]}
        }
    }"#;
    let flow = compile_workflow(text).unwrap().into_flow();
    let agent = flow.agent("agent").unwrap();
    assert_eq!(agent.role, AgentRole::Image);
    assert_eq!(agent.model_ref, "m2");
    assert_eq!(flow.edges[0].from.node_id, "m2");
    let model_ids: Vec<_> = flow.models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(model_ids, vec!["m1", "m2"]);
    assert_eq!(flow.models[0].model, FALLBACK_MODEL_NAME);
}

#[test]
fn compilation_is_deterministic() {
    let text = fixture("fixtures/project/supervisor.json");
    let first = compile_workflow(&text).unwrap().into_flow();
    let second = compile_workflow(&text).unwrap().into_flow();
    assert_eq!(first, second);
}
