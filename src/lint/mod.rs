mod referential;

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{FlowError, Result},
    flow_ir::Flow,
    schema_validate::validate_against,
};

pub use referential::ReferentialRule;

const FLOW_SCHEMA: &str = include_str!("../../schemas/flow.schema.json");
const FLOW_SCHEMA_LABEL: &str = "<embedded flow schema>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub id: &'static str,
    pub level: DiagnosticLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Diagnostic {
    pub fn error(id: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            id,
            level: DiagnosticLevel::Error,
            message: message.into(),
            suggestion: None,
            node_id: None,
            path: None,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Check an assembled flow against its own schema and referential rules.
///
/// `node_ids` is the full node id set of the source document, used to check
/// edge endpoints.
pub fn validate_flow<'a>(
    flow: &Flow,
    node_ids: impl IntoIterator<Item = &'a str>,
) -> Result<ValidationReport> {
    let mut diagnostics = schema_diagnostics(flow)?;
    diagnostics.extend(ReferentialRule::check(flow, node_ids));
    let ok = diagnostics
        .iter()
        .all(|d| d.level != DiagnosticLevel::Error);
    Ok(ValidationReport { ok, diagnostics })
}

/// Like [`validate_flow`] but turns any error diagnostic into
/// [`FlowError::InternalInvariant`].
pub fn ensure_valid<'a>(flow: &Flow, node_ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let report = validate_flow(flow, node_ids)?;
    if report.ok {
        return Ok(());
    }
    let message = report
        .diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Error)
        .map(|d| format!("{}: {}", d.id, d.message))
        .collect::<Vec<_>>()
        .join("\n");
    Err(FlowError::InternalInvariant {
        message,
        diagnostics: report.diagnostics,
    })
}

fn schema_diagnostics(flow: &Flow) -> Result<Vec<Diagnostic>> {
    let value: Value = serde_json::to_value(flow).map_err(|e| FlowError::InternalInvariant {
        message: format!("flow is not serializable: {e}"),
        diagnostics: Vec::new(),
    })?;
    Ok(validate_against(&value, FLOW_SCHEMA, FLOW_SCHEMA_LABEL)?
        .into_iter()
        .map(|violation| {
            Diagnostic::error("flow.schema.invalid", violation.message)
                .with_path(violation.pointer)
                .with_suggestion("Check required fields: models, tools, agents, edges")
        })
        .collect())
}
