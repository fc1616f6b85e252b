// src/error.rs

//! Central error types for the transformation pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a module transformation
///
/// Every variant is fatal: no pipeline step retries, and any failure
/// aborts the remaining steps and discards the work area.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing CLI input; reported before any work is attempted
    #[error("{0}")]
    Usage(String),

    /// Schema violates the required structural shape
    #[error("schema '{}': {reason}", .path.display())]
    SchemaShape { path: PathBuf, reason: String },

    /// Ledger entries registered as mandatory were never consumed by a
    /// rewrite pass. Always a bug in the pipeline's own bookkeeping: an
    /// unreplaced reference means the generated module will not compile.
    #[error("replacements not applied during {pass} rewrite: {}", .entries.join(", "))]
    MissingReplacements { pass: String, entries: Vec<String> },

    /// A subprocess exited non-zero; captured output attached verbatim
    #[error("command '{command}' failed with {status}\n\n{output}")]
    Subprocess {
        command: String,
        status: String,
        output: String,
    },

    /// Malformed dependency manifest
    #[error("manifest {}:{line}: {reason}", .path.display())]
    ManifestParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Go source that tree-sitter could not parse
    #[error("source {}:{row}:{column}: syntax error", .path.display())]
    SourceParse {
        path: PathBuf,
        row: usize,
        column: usize,
    },

    /// Implementation package failed validation; all problems aggregated
    #[error("loading package failed:\n{}", .problems.join("\n"))]
    Package { problems: Vec<String> },

    /// Side-channel metadata file is missing required content
    #[error("metadata {}: {reason}", .path.display())]
    Metadata { path: PathBuf, reason: String },

    /// Failed to deserialize the metadata file
    #[error("metadata parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Schema read or parse failure, propagated from the proto frontend
    #[error("schema compiler: {0}")]
    SchemaCompiler(#[from] anyhow::Error),

    /// Pipeline-internal failure (grammar initialization and similar)
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O failure with the offending path attached
    #[error("{}: {source}", .path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure without a more specific path context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach a path to an I/O error
    pub fn path_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::PathIo {
            path: path.into(),
            source,
        }
    }
}
