use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    compile_graph,
    emit::CodeEmitter,
    error::{FlowError, Result},
    loader::load_workflow_from_path,
    overrides::{read_override_mapping, sidecar_path_for_workflow},
    path_safety::workflow_output_dir,
    registry::{OVERRIDE_SUFFIX, support_matrix},
};

pub const DEFAULT_SOURCE_DIR: &str = ".project";
pub const DEFAULT_OUT_DIR: &str = "apps/admin/src/agents";

/// Where to read workflow exports from and where to write generated modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub source_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltWorkflow {
    pub source: PathBuf,
    pub workflow_id: String,
    pub output_dir: PathBuf,
    pub hash_blake3: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub workflows: Vec<BuiltWorkflow>,
}

/// Compile every workflow export in `source_dir` into `out_dir`.
///
/// Documents are processed in directory listing order. The first failing
/// document aborts the run; modules already written stay on disk.
pub fn build_agents(opts: &BuildOptions) -> Result<BuildReport> {
    let emitter = CodeEmitter::new()?;
    let entries = fs::read_dir(&opts.source_dir).map_err(|e| FlowError::io(&opts.source_dir, e))?;
    let mut report = BuildReport::default();
    for entry in entries {
        let path = entry.map_err(|e| FlowError::io(&opts.source_dir, e))?.path();
        if !is_workflow_export(&path) {
            debug!(path = %path.display(), "skipping non-workflow entry");
            continue;
        }
        report
            .workflows
            .push(build_workflow(&path, &opts.out_dir, &emitter)?);
    }
    Ok(report)
}

/// Compile a single export and write its modules under `out_dir`.
pub fn build_workflow(path: &Path, out_dir: &Path, emitter: &CodeEmitter) -> Result<BuiltWorkflow> {
    let graph = load_workflow_from_path(path)?;
    for item in support_matrix(&graph).unsupported() {
        warn!(
            workflow = %graph.id,
            node = %item.node_id,
            status = ?item.status,
            reasons = ?item.reasons,
            "node is not fully supported"
        );
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_dir = workflow_output_dir(out_dir, &graph.id, &stem)?;

    let overrides = read_override_mapping(&sidecar_path_for_workflow(path))?;
    let mut bundle = compile_graph(&graph, &overrides)?;
    if bundle.id.is_empty() {
        bundle.id = stem;
    }

    let artifacts = emitter.emit(&bundle)?;
    artifacts.write_to(&output_dir)?;
    let hash_blake3 = artifacts.hash_blake3();
    info!(
        workflow = %bundle.id,
        output = %output_dir.display(),
        hash = %hash_blake3,
        "wrote agent modules"
    );
    Ok(BuiltWorkflow {
        source: path.to_path_buf(),
        workflow_id: bundle.id,
        output_dir,
        hash_blake3,
    })
}

/// `*.json` files that are not `*.map.json` override sidecars.
fn is_workflow_export(path: &Path) -> bool {
    let is_json = path.extension() == Some(OsStr::new("json"));
    let is_sidecar = path
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.ends_with(OVERRIDE_SUFFIX));
    is_json && !is_sidecar && path.is_file()
}
