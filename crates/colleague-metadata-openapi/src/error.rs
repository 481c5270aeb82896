//! Typed error enum for the `colleague-metadata-openapi` library API.
//!
//! Per-route synthesis failures are logged and skipped; only failures that
//! stop a whole request surface here. The CLI converts these to
//! `anyhow::Error` at the binary boundary.

use std::path::PathBuf;

/// Errors produced by document, manifest and discovery builders.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Catalog, configuration source or version resolution failure.
    #[error(transparent)]
    Core(#[from] colleague_metadata_core::Error),

    /// File I/O failure (reading config).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Manifest CSV serialization failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A manifest selection segment cannot name a file.
    #[error("Invalid manifest selection '{segment}'.")]
    InvalidSegment {
        /// The rejected segment.
        segment: String,
    },

    /// A publish target could not be written.
    #[error("No access to update '{}'. ", path.display())]
    Publish {
        /// File or directory being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time assertion that `Error` is `Send + Sync`.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    };

    #[test]
    fn publish_error_names_the_path() {
        let err = Error::Publish {
            path: PathBuf::from("/docs/persons.yaml"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.to_string(), "No access to update '/docs/persons.yaml'. ");
    }
}
