//! Error types for project file operations.

use std::path::PathBuf;

use patchbay_core::GraphError;
use thiserror::Error;

/// Errors that can occur while loading or saving a project file.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse or serialize JSON
    #[error("failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document declares a format version this build cannot read
    #[error("unsupported project format version {0}")]
    UnsupportedVersion(u32),

    /// A module record names a kind this build does not know
    #[error("unknown module kind: {0}")]
    UnknownModuleKind(String),

    /// A connection references a node id with no module record
    #[error("connection references unknown node id {0}")]
    DanglingConnection(u32),

    /// The same node id appears in more than one module record
    #[error("duplicate node id {0} in module list")]
    DuplicateNodeId(u32),

    /// The described graph violates a structural invariant
    #[error("invalid graph structure: {0}")]
    Graph(#[from] GraphError),
}

impl ProjectError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProjectError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProjectError::WriteFile {
            path: path.into(),
            source,
        }
    }
}
