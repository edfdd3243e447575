use std::{
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Where in a source document an error was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowErrorLocation {
    pub path: Option<String>,
    pub source_path: Option<PathBuf>,
    pub line: Option<usize>,
    pub col: Option<usize>,
    pub json_pointer: Option<String>,
}

impl FlowErrorLocation {
    pub fn at_path(path: impl Into<String>) -> Self {
        FlowErrorLocation {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn at_path_with_position(
        path: impl Into<String>,
        line: Option<usize>,
        col: Option<usize>,
    ) -> Self {
        FlowErrorLocation {
            path: Some(path.into()),
            line,
            col,
            ..Default::default()
        }
    }

    pub fn with_source_path(mut self, source_path: Option<&Path>) -> Self {
        self.source_path = source_path.map(Path::to_path_buf);
        self
    }

    pub fn with_json_pointer(mut self, pointer: Option<String>) -> Self {
        self.json_pointer = pointer;
        self
    }

    /// Human readable `path:line:col` form, if a path is known.
    pub fn describe(&self) -> Option<String> {
        let base = self
            .path
            .clone()
            .or_else(|| self.source_path.as_ref().map(|p| p.display().to_string()))?;
        Some(match (self.line, self.col) {
            (Some(line), Some(col)) => format!("{base}:{line}:{col}"),
            (Some(line), None) => format!("{base}:{line}"),
            _ => base,
        })
    }
}

impl fmt::Display for FlowErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Some(text) => f.write_str(&text),
            None => f.write_str("<unknown>"),
        }
    }
}

/// One structural violation found while validating a document.
#[derive(Debug, Clone)]
pub struct SchemaErrorDetail {
    pub message: String,
    pub location: FlowErrorLocation,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("JSON parse error at {location}: {message}")]
    Json {
        message: String,
        location: FlowErrorLocation,
    },
    #[error("Schema validation failed:\n{message}")]
    Schema {
        message: String,
        details: Vec<SchemaErrorDetail>,
        location: FlowErrorLocation,
    },
    #[error("Assembled flow violates its own invariants (resolver defect):\n{message}")]
    InternalInvariant {
        message: String,
        diagnostics: Vec<crate::lint::Diagnostic>,
    },
    #[error("I/O error at {location}: {message}")]
    Io {
        message: String,
        location: FlowErrorLocation,
    },
    #[error("Workflow id '{id}' cannot be used as an output directory: {message}")]
    UnsafePath { id: String, message: String },
    #[error("Failed to emit {artifact}: {message}")]
    Emit { artifact: String, message: String },
    #[error("Internal error at {location}: {message}")]
    Internal {
        message: String,
        location: FlowErrorLocation,
    },
}

impl FlowError {
    pub(crate) fn io(path: &Path, err: impl fmt::Display) -> Self {
        FlowError::Io {
            message: err.to_string(),
            location: FlowErrorLocation::at_path(path.display().to_string())
                .with_source_path(Some(path)),
        }
    }

    /// Structural details, empty for anything but `Schema`.
    pub fn schema_details(&self) -> &[SchemaErrorDetail] {
        match self {
            FlowError::Schema { details, .. } => details,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
