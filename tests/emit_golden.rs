use agent_flow::{
    compile_workflow, compile_workflow_with_overrides,
    emit::CodeEmitter,
    overrides::{parse_override_mapping, read_override_mapping},
};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::{fs, path::Path};

const CONFIG_PREFIX: &str = "export const flowConfig = ";
const CONFIG_SUFFIX: &str = " as const;\n";

fn supervisor_artifacts() -> agent_flow::emit::ArtifactSet {
    let text = fs::read_to_string("fixtures/project/supervisor.json").unwrap();
    let overrides =
        read_override_mapping(Path::new("fixtures/project/supervisor.map.json")).unwrap();
    let bundle = compile_workflow_with_overrides(&text, &overrides).unwrap();
    CodeEmitter::new().unwrap().emit(&bundle).unwrap()
}

fn config_json(config_ts: &str) -> Value {
    let body = config_ts
        .strip_prefix(CONFIG_PREFIX)
        .and_then(|rest| rest.strip_suffix(CONFIG_SUFFIX))
        .expect("config module wrapper");
    serde_json::from_str(body).unwrap()
}

#[test]
fn schema_module_for_supervisor_fixture() {
    let artifacts = supervisor_artifacts();
    assert!(artifacts.schema_ts.ends_with(";\n\n"));
    assert_snapshot!(artifacts.schema_ts, @r#"
    import { z } from 'zod';

    export const trigger_1Input = z.object({});
    export type trigger_1Input = z.infer<typeof trigger_1Input>;

    export const memory_1Input = z.object({});
    export type memory_1Input = z.infer<typeof memory_1Input>;

    export const observer_toolInput = z.object({
      "text": z.string()
    });
    export type observer_toolInput = z.infer<typeof observer_toolInput>;
    export const observer_toolOutput = z.object({
      "intent": z.boolean(),
      "topic": z.string()
    });
    export type observer_toolOutput = z.infer<typeof observer_toolOutput>;

    export const _9searchInput = z.object({
      "url": z.string(),
      "method": z.string(),
      "sendQuery": z.boolean(),
      "q": z.string(),
      "limit": z.number()
    });
    export type _9searchInput = z.infer<typeof _9searchInput>;
    export const _9searchOutput = z.object({
      "results": z.array(z.unknown()),
      "meta": z.unknown()
    });
    export type _9searchOutput = z.infer<typeof _9searchOutput>;
    "#);
}

#[test]
fn config_module_for_supervisor_fixture() {
    let artifacts = supervisor_artifacts();
    assert!(artifacts.config_ts.starts_with("export const flowConfig = {\n  \"id\""));
    assert_eq!(
        config_json(&artifacts.config_ts),
        json!({
            "id": "supervisorFlow01",
            "name": "Smart Supervisor Assistant",
            "models": [{"id": "model-1", "provider": "openai", "model": "gpt-4.1-mini"}],
            "agents": [{
                "id": "agent-1",
                "name": "Supervisor Agent",
                "role": "supervisor",
                "modelRef": "model-1",
                "tools": ["trigger-1", "memory-1", "observer-tool", "9search"],
                "system": "You coordinate helper agents."
            }],
            "tools": [
                {"id": "trigger-1", "name": "When chat message received", "description": "Tool generated from n8n node"},
                {"id": "memory-1", "name": "Conversation Memory", "description": "Tool generated from n8n node"},
                {"id": "observer-tool", "name": "Observer Agent Tool", "description": "Detects content creation intent."},
                {"id": "9search", "name": "Search API Tool", "description": "Searches the web."}
            ]
        })
    );
}

#[test]
fn agent_without_system_message_omits_the_key() {
    let text = fs::read_to_string("fixtures/no_models.json").unwrap();
    let bundle = compile_workflow(&text).unwrap();
    let artifacts = CodeEmitter::new().unwrap().emit(&bundle).unwrap();
    let config = config_json(&artifacts.config_ts);
    assert!(config["agents"][0].get("system").is_none());
    assert_eq!(config["models"][0]["id"], "openai-default");
    assert_eq!(config["tools"], json!([]));
    assert_eq!(artifacts.schema_ts, "import { z } from 'zod';\n\n");
}

#[test]
fn index_module_reexports_siblings() {
    let artifacts = supervisor_artifacts();
    assert_eq!(
        artifacts.index_ts,
        "export * from './config';\nexport * from './schema';\n"
    );
}

#[test]
fn emission_is_byte_identical_across_runs() {
    let first = supervisor_artifacts();
    let second = supervisor_artifacts();
    assert_eq!(first, second);
    assert_eq!(first.hash_blake3(), second.hash_blake3());
}

#[test]
fn override_adds_field_to_inferred_input() {
    let text = json!({
        "id": "wf",
        "name": "Workflow",
        "nodes": [{
            "id": "t1",
            "name": "Writer Tool",
            "type": "@n8n/n8n-nodes-langchain.agentTool",
            "position": [0, 0],
            "parameters": {"text": "hello"}
        }],
        "connections": {}
    })
    .to_string();
    let overrides =
        parse_override_mapping(r#"{"inputs": {"t1": {"url": "string"}}}"#, "inline").unwrap();
    let bundle = compile_workflow_with_overrides(&text, &overrides).unwrap();
    let schema = CodeEmitter::new().unwrap().emit(&bundle).unwrap().schema_ts;
    assert!(schema.contains(
        "export const t1Input = z.object({\n  \"text\": z.string(),\n  \"url\": z.string()\n});\n"
    ));
    assert!(!schema.contains("t1Output"));
}

#[test]
fn colliding_identifiers_are_suffixed() {
    let tool = |id: &str, name: &str| {
        json!({
            "id": id,
            "name": name,
            "type": "n8n-nodes-base.httpRequestTool",
            "position": [0, 0],
            "parameters": {}
        })
    };
    let text = json!({
        "id": "wf",
        "name": "Workflow",
        "nodes": [tool("a-b", "First"), tool("a_b", "Second")],
        "connections": {}
    })
    .to_string();
    let bundle = compile_workflow(&text).unwrap();
    let schema = CodeEmitter::new().unwrap().emit(&bundle).unwrap().schema_ts;
    assert!(schema.contains("export const a_bInput = z.object({});"));
    assert!(schema.contains("export const a_b_2Input = z.object({});"));
}
