use blake3::Hasher;

use crate::flow_ir::Flow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowBundleVersion {
    V1,
}

/// A compiled workflow: the validated flow plus the document identity the
/// emitter needs.
#[derive(Debug, Clone)]
pub struct WorkflowBundle {
    pub version: WorkflowBundleVersion,
    pub id: String,
    pub name: String,
    pub flow: Flow,
}

impl WorkflowBundle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, flow: Flow) -> Self {
        WorkflowBundle {
            version: WorkflowBundleVersion::V1,
            id: id.into(),
            name: name.into(),
            flow,
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn into_flow(self) -> Flow {
        self.flow
    }
}

/// Compute a lowercase hex-encoded BLAKE3 hash for the provided bytes.
pub fn blake3_hex(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes.as_ref());
    hasher.finalize().to_hex().to_string()
}
