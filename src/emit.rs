use std::{fs, path::Path};

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::{
    bundle::{WorkflowBundle, blake3_hex},
    error::{FlowError, Result},
    flow_ir::{AgentRole, FieldKind, ModelRef, Shape},
    util::IdentAllocator,
};

pub const CONFIG_FILE: &str = "config.ts";
pub const SCHEMA_FILE: &str = "schema.ts";
pub const INDEX_FILE: &str = "index.ts";

const CONFIG_TEMPLATE: &str = "export const flowConfig = {{{config}}} as const;\n";
const SCHEMA_HEADER_TEMPLATE: &str = "import { z } from '{{validator_module}}';\n\n";
const VALIDATOR_TEMPLATE: &str = "export const {{name}} = {{{object_expr}}};\nexport type {{name}} = z.infer<typeof {{name}}>;\n";
const INDEX_TEMPLATE: &str = "export * from './{{config_module}}';\nexport * from './{{schema_module}}';\n";

/// Validator expression for one field kind; unknown kinds accept anything.
pub fn zod_expr(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "z.string()",
        FieldKind::Number => "z.number()",
        FieldKind::Boolean => "z.boolean()",
        FieldKind::Array => "z.array(z.unknown())",
        FieldKind::Object => "z.record(z.unknown())",
        FieldKind::Other(_) => "z.unknown()",
    }
}

/// `z.object({...})` for a shape, keys JSON-quoted, in shape order.
pub fn object_expr(shape: &Shape) -> String {
    if shape.is_empty() {
        return "z.object({})".to_string();
    }
    let props = shape
        .iter()
        .map(|(key, kind)| format!("  {}: {}", json_string(key), zod_expr(kind)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("z.object({{\n{props}\n}})")
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// The three generated modules for one workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub config_ts: String,
    pub schema_ts: String,
    pub index_ts: String,
}

impl ArtifactSet {
    /// Content hash over all artifacts, stable across runs.
    pub fn hash_blake3(&self) -> String {
        let mut bytes = Vec::new();
        for (name, body) in self.files() {
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(0);
            bytes.extend_from_slice(body.as_bytes());
            bytes.push(0);
        }
        blake3_hex(bytes)
    }

    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (CONFIG_FILE, self.config_ts.as_str()),
            (SCHEMA_FILE, self.schema_ts.as_str()),
            (INDEX_FILE, self.index_ts.as_str()),
        ]
    }

    /// Write every artifact into `dir`, creating it first.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| FlowError::io(dir, e))?;
        for (name, body) in self.files() {
            let path = dir.join(name);
            fs::write(&path, body).map_err(|e| FlowError::io(&path, e))?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigAgent<'a> {
    id: &'a str,
    name: &'a str,
    role: AgentRole,
    model_ref: &'a str,
    tools: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct ConfigTool<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct ConfigDoc<'a> {
    id: &'a str,
    name: &'a str,
    models: &'a [ModelRef],
    agents: Vec<ConfigAgent<'a>>,
    tools: Vec<ConfigTool<'a>>,
}

/// Renders generated modules from a compiled workflow.
pub struct CodeEmitter {
    handlebars: Handlebars<'static>,
}

impl CodeEmitter {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(|s| s.to_string());
        for (name, template) in [
            (CONFIG_FILE, CONFIG_TEMPLATE),
            ("schema_header", SCHEMA_HEADER_TEMPLATE),
            ("validator", VALIDATOR_TEMPLATE),
            (INDEX_FILE, INDEX_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| FlowError::Emit {
                    artifact: name.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(Self { handlebars })
    }

    pub fn emit(&self, bundle: &WorkflowBundle) -> Result<ArtifactSet> {
        Ok(ArtifactSet {
            config_ts: self.render_config(bundle)?,
            schema_ts: self.render_schema(bundle)?,
            index_ts: self.render(
                INDEX_FILE,
                &json!({"config_module": "config", "schema_module": "schema"}),
            )?,
        })
    }

    fn render_config(&self, bundle: &WorkflowBundle) -> Result<String> {
        let flow = &bundle.flow;
        let doc = ConfigDoc {
            id: &bundle.id,
            name: &bundle.name,
            models: &flow.models,
            agents: flow
                .agents
                .iter()
                .map(|agent| ConfigAgent {
                    id: &agent.id,
                    name: &agent.name,
                    role: agent.role,
                    model_ref: &agent.model_ref,
                    tools: &agent.tools,
                    system: agent.system.as_deref(),
                })
                .collect(),
            tools: flow
                .tools
                .iter()
                .map(|tool| ConfigTool {
                    id: &tool.id,
                    name: &tool.name,
                    description: &tool.description,
                })
                .collect(),
        };
        let config = serde_json::to_string_pretty(&doc).map_err(|e| FlowError::Emit {
            artifact: CONFIG_FILE.to_string(),
            message: e.to_string(),
        })?;
        self.render(CONFIG_FILE, &json!({ "config": config }))
    }

    fn render_schema(&self, bundle: &WorkflowBundle) -> Result<String> {
        let mut out = self.render("schema_header", &json!({"validator_module": "zod"}))?;
        let mut idents = IdentAllocator::default();
        for tool in &bundle.flow.tools {
            let ident = idents.allocate(&tool.id);
            out.push_str(&self.render_validator(&format!("{ident}Input"), &tool.input_shape)?);
            if !tool.output_shape.is_empty() {
                out.push_str(
                    &self.render_validator(&format!("{ident}Output"), &tool.output_shape)?,
                );
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn render_validator(&self, name: &str, shape: &Shape) -> Result<String> {
        self.render(
            "validator",
            &json!({"name": name, "object_expr": object_expr(shape)}),
        )
    }

    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String> {
        self.handlebars
            .render(template, data)
            .map_err(|e| FlowError::Emit {
                artifact: template.to_string(),
                message: e.to_string(),
            })
    }
}
