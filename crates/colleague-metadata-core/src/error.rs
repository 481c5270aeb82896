//! Typed error enum for the `colleague-metadata-core` library API.

/// Errors produced while loading the catalog or resolving versions.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading the catalog).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A version string contained a non-numeric segment.
    ///
    /// Surfaces to HTTP callers as "not found".
    #[error("Requested version is not supported.")]
    VersionNotSupported {
        /// The offending version string.
        version: String,
    },

    /// A configuration source failed to answer a lookup.
    #[error("configuration source: {0}")]
    Source(String),

    /// A field type string in the catalog could not be parsed.
    #[error("invalid field type '{0}'")]
    InvalidFieldType(String),
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
