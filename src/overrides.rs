use indexmap::IndexMap;
use serde::{Deserialize, de::IgnoredAny};
use serde_json::Value;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    error::{FlowError, Result},
    flow_ir::{FieldKind, Shape, ToolShapes},
    loader::json_error_location,
    registry::OVERRIDE_SUFFIX,
};

/// Hand-authored patch for inferred tool shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMapping {
    pub inputs: IndexMap<String, Shape>,
    pub outputs: IndexMap<String, Shape>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOverrideMapping {
    #[serde(default)]
    inputs: Option<RawSection>,
    #[serde(default)]
    outputs: Option<RawSection>,
}

/// A section is a map of tool id to fields; anything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSection {
    Tools(IndexMap<String, RawToolFields>),
    Ignored(#[allow(dead_code)] IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawToolFields {
    Fields(IndexMap<String, Value>),
    Ignored(#[allow(dead_code)] IgnoredAny),
}

impl From<RawOverrideMapping> for OverrideMapping {
    fn from(raw: RawOverrideMapping) -> Self {
        OverrideMapping {
            inputs: to_shapes(raw.inputs),
            outputs: to_shapes(raw.outputs),
        }
    }
}

/// Non-object tool entries are skipped and non-string kinds degrade to an
/// accept-anything field.
fn to_shapes(section: Option<RawSection>) -> IndexMap<String, Shape> {
    let Some(RawSection::Tools(tools)) = section else {
        return IndexMap::new();
    };
    tools
        .into_iter()
        .filter_map(|(tool_id, entry)| {
            let RawToolFields::Fields(fields) = entry else {
                debug!(tool = %tool_id, "skipping non-object override entry");
                return None;
            };
            let shape = fields
                .into_iter()
                .map(|(field, kind)| {
                    let kind = match kind {
                        Value::String(tag) => FieldKind::from_tag(&tag),
                        other => FieldKind::Other(other.to_string()),
                    };
                    (field, kind)
                })
                .collect();
            Some((tool_id, shape))
        })
        .collect()
}

/// `<dir>/<stem>.map.json` for a workflow at `<dir>/<stem>.json`.
pub fn sidecar_path_for_workflow(workflow_path: &Path) -> PathBuf {
    let stem = workflow_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    workflow_path.with_file_name(format!("{stem}{OVERRIDE_SUFFIX}"))
}

/// Parse an override mapping from JSON text.
///
/// Missing or `null` sections are empty. Only text that is not a JSON object
/// with optional `inputs`/`outputs` sections is an error.
pub fn parse_override_mapping(json: &str, source_label: &str) -> Result<OverrideMapping> {
    let raw: RawOverrideMapping = serde_json::from_str(json).map_err(|e| FlowError::Json {
        message: e.to_string(),
        location: json_error_location(source_label, None, &e),
    })?;
    Ok(raw.into())
}

/// Read the sidecar mapping if present.
///
/// A missing or unparseable sidecar is an empty mapping; the latter is
/// reported with `warn!`. Other read failures are errors.
pub fn read_override_mapping(path: &Path) -> Result<OverrideMapping> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no override mapping");
            return Ok(OverrideMapping::default());
        }
        Err(e) => return Err(FlowError::io(path, e)),
    };
    match parse_override_mapping(&text, &path.display().to_string()) {
        Ok(mapping) => Ok(mapping),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable override mapping");
            Ok(OverrideMapping::default())
        }
    }
}

/// Shallow-merge overrides into inferred shapes.
///
/// Override fields replace same-named inferred fields in place; new fields are
/// appended. Entries for unknown tool ids are ignored. Merging the same
/// mapping twice gives the same result as merging it once.
pub fn merge_overrides(mut shapes: ToolShapes, mapping: &OverrideMapping) -> ToolShapes {
    for (tool_id, fields) in &mapping.inputs {
        if let Some(shape) = shapes.get_mut(tool_id) {
            merge_shape(&mut shape.input, fields);
        }
    }
    for (tool_id, fields) in &mapping.outputs {
        if let Some(shape) = shapes.get_mut(tool_id) {
            merge_shape(&mut shape.output, fields);
        }
    }
    shapes
}

fn merge_shape(target: &mut Shape, fields: &Shape) {
    for (field, kind) in fields {
        target.insert(field.clone(), kind.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow_ir::ToolShape;
    use pretty_assertions::assert_eq;

    fn inferred() -> ToolShapes {
        let mut shapes = ToolShapes::new();
        let mut shape = ToolShape::default();
        shape.input.insert("text".into(), FieldKind::String);
        shape.input.insert("limit".into(), FieldKind::String);
        shapes.insert("tool-1".into(), shape);
        shapes
    }

    #[test]
    fn override_replaces_in_place_and_appends_new_fields() {
        let mapping = parse_override_mapping(
            r#"{"inputs": {"tool-1": {"limit": "number", "url": "string"}, "ghost": {"x": "string"}},
                "outputs": {"tool-1": {"ok": "boolean"}}}"#,
            "<test>",
        )
        .unwrap();
        let merged = merge_overrides(inferred(), &mapping);
        let input: Vec<_> = merged["tool-1"]
            .input
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_tag()))
            .collect();
        assert_eq!(
            input,
            vec![("text", "string"), ("limit", "number"), ("url", "string")]
        );
        assert_eq!(merged["tool-1"].output.get("ok"), Some(&FieldKind::Boolean));
        assert!(!merged.contains_key("ghost"));
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let mapping = parse_override_mapping(
            r#"{"inputs": {"tool-1": {"url": "string"}}, "outputs": {"tool-1": {"n": "number"}}}"#,
            "<test>",
        )
        .unwrap();
        let once = merge_overrides(inferred(), &mapping);
        let twice = merge_overrides(once.clone(), &mapping);
        assert_eq!(once, twice);
    }

    #[test]
    fn non_string_kinds_degrade_to_other() {
        let mapping =
            parse_override_mapping(r#"{"inputs": {"t": {"n": 5}}}"#, "<test>").unwrap();
        assert_eq!(mapping.inputs["t"]["n"], FieldKind::Other("5".into()));
        assert!(mapping.outputs.is_empty());
    }

    #[test]
    fn sidecar_path_uses_file_stem() {
        let path = sidecar_path_for_workflow(Path::new("flows/support.json"));
        assert_eq!(path, PathBuf::from("flows/support.map.json"));
    }

    #[test]
    fn missing_sidecar_is_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let mapping = read_override_mapping(&dir.path().join("absent.map.json")).unwrap();
        assert_eq!(mapping, OverrideMapping::default());
    }

    #[test]
    fn malformed_sidecar_is_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.map.json");
        fs::write(&path, "{ nope").unwrap();
        assert_eq!(
            read_override_mapping(&path).unwrap(),
            OverrideMapping::default()
        );
        assert!(matches!(
            parse_override_mapping("{ nope", "<test>").unwrap_err(),
            FlowError::Json { .. }
        ));
    }

    #[test]
    fn null_sections_are_empty() {
        let mapping = parse_override_mapping(
            r#"{"inputs": null, "outputs": {"t": {"ok": "boolean"}}}"#,
            "<test>",
        )
        .unwrap();
        assert!(mapping.inputs.is_empty());
        assert_eq!(mapping.outputs["t"]["ok"], FieldKind::Boolean);

        let mapping = parse_override_mapping(r#"{"inputs": [1, 2], "outputs": "x"}"#, "<test>")
            .unwrap();
        assert_eq!(mapping, OverrideMapping::default());
    }

    #[test]
    fn non_object_tool_entries_are_skipped() {
        let mapping = parse_override_mapping(
            r#"{"inputs": {"t": "string", "u": null, "v": {"url": "string"}}}"#,
            "<test>",
        )
        .unwrap();
        let tools: Vec<_> = mapping.inputs.keys().map(String::as_str).collect();
        assert_eq!(tools, vec!["v"]);
        assert_eq!(mapping.inputs["v"]["url"], FieldKind::String);
    }

    #[test]
    fn field_order_follows_the_document() {
        let mapping = parse_override_mapping(
            r#"{"outputs": {"t": {"results": "array", "meta": "date"}}}"#,
            "<test>",
        )
        .unwrap();
        let fields: Vec<_> = mapping.outputs["t"].keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["results", "meta"]);
    }
}
