//! Error types for the `crag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur across the indexing and workflow layers.
#[derive(Debug, Error)]
pub enum CragError {
    /// A document path or index directory does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// `persist` was called before the index was built.
    #[error("index not built: nothing to persist")]
    NotBuilt,

    /// `retrieve` was called on an index that was neither built nor loaded.
    #[error("index not initialized: build or load it before querying")]
    NotInitialized,

    /// An index build was attempted over zero chunks.
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    /// The embedding provider's dimensionality does not match the persisted index.
    #[error(
        "embedding dimension mismatch: index stores {expected}-dimensional vectors, \
         provider produces {actual}"
    )]
    DimensionMismatch {
        /// Dimensionality recorded in the index manifest.
        expected: usize,
        /// Dimensionality of the provider supplied at load time.
        actual: usize,
    },

    /// The embedding provider identity does not match the one recorded at build time.
    #[error("embedding model mismatch: index was built with '{expected}', provider is '{actual}'")]
    ModelMismatch {
        /// Identity recorded in the index manifest.
        expected: String,
        /// Identity of the provider supplied at load time.
        actual: String,
    },

    /// Answer generation was attempted with no supporting evidence.
    #[error("generation attempted with no supporting evidence")]
    InsufficientEvidence,

    /// An error occurred in the embedding backend.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the language-model backend.
    #[error("model error ({model}): {message}")]
    Model {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing a persisted index failed.
    #[error("persistence error at {path}: {message}")]
    Persist {
        /// The file or directory involved.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for crag operations.
pub type Result<T> = std::result::Result<T, CragError>;
