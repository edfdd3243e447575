use jsonschema::Draft;
use serde_json::Value;

use crate::error::{FlowError, FlowErrorLocation, Result};

/// A single JSON Schema violation, addressed by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub pointer: String,
    pub message: String,
}

/// Validate `doc` against an embedded Draft 2020-12 schema.
///
/// Returns every violation; an empty list means the document conforms.
/// Failure to parse or compile the schema itself is an internal error.
pub fn validate_against(
    doc: &Value,
    schema_text: &str,
    schema_label: &str,
) -> Result<Vec<SchemaViolation>> {
    let schema: Value = serde_json::from_str(schema_text).map_err(|e| FlowError::Internal {
        message: format!("schema parse for {schema_label}: {e}"),
        location: FlowErrorLocation::at_path(schema_label.to_string()),
    })?;
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| FlowError::Internal {
            message: format!("schema compile for {schema_label}: {e}"),
            location: FlowErrorLocation::at_path(schema_label.to_string()),
        })?;
    Ok(validator
        .iter_errors(doc)
        .map(|e| {
            let pointer = e.instance_path().to_string();
            let pointer = if pointer.is_empty() {
                "/".to_string()
            } else {
                pointer
            };
            SchemaViolation {
                pointer,
                message: e.to_string(),
            }
        })
        .collect())
}
