use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort generation of a single schema document.
///
/// Everything below the document level (malformed field lines, unknown type
/// tokens) is absorbed by the translator and never surfaces here.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The expected top-level definition block is absent (or unterminated).
    #[error("could not find {0} block in CUE schema")]
    BlockNotFound(String),

    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
