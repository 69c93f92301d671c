//! Error types for scanning and serving.
//!
//! Per-file problems (a name that does not match, an image whose header
//! cannot be read) are not errors and never show up here. These variants
//! abort the run.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors raised while scanning a directory or writing the document
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ScanError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Errors raised while starting or running the preview server
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Template directory is required for preview server.")]
    TemplateMissing,

    #[error("invalid listen address {addr}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_the_path() {
        let err = ScanError::io(
            Path::new("/tmp/shots/1_origin.jpg"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let message = err.to_string();
        assert!(message.contains("1_origin.jpg"));
        assert!(message.contains("gone"));
    }

    #[test]
    fn test_template_missing_message() {
        assert_eq!(
            ServeError::TemplateMissing.to_string(),
            "Template directory is required for preview server."
        );
    }
}
