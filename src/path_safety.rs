use std::path::{Component, Path, PathBuf};

use crate::error::{FlowError, Result};

/// Resolve the output directory for a workflow under `out_root`.
///
/// The directory is named after the workflow id, or after the source file stem
/// when the id is empty. The name must be a single plain path component so a
/// document cannot write outside `out_root`.
pub fn workflow_output_dir(out_root: &Path, workflow_id: &str, file_stem: &str) -> Result<PathBuf> {
    let name = if workflow_id.is_empty() {
        file_stem
    } else {
        workflow_id
    };
    let unsafe_path = |message: &str| FlowError::UnsafePath {
        id: name.to_string(),
        message: message.to_string(),
    };
    if name.is_empty() {
        return Err(unsafe_path("empty directory name"));
    }
    if name.contains(['/', '\\']) {
        return Err(unsafe_path("contains a path separator"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(out_root.join(name)),
        _ => Err(unsafe_path("not a plain directory name")),
    }
}
