//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The normalization policy applied to embedding vectors.
///
/// Index similarity scoring is only well-defined when the policy is known:
/// with [`UnitL2`](Normalization::UnitL2) vectors, cosine similarity and
/// inner product coincide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Normalization {
    /// Vectors are L2-normalized to unit length.
    UnitL2,
    /// Vectors are returned as produced by the model.
    None,
}

/// The identity of an embedding configuration: model name plus normalization
/// policy.
///
/// Every embedding is bound to exactly one identity. An index built with one
/// identity must be queried and reloaded with the same identity, otherwise
/// similarity scores are meaningless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddingIdentity {
    /// The embedding model name (and version, where the backend exposes one).
    pub model: String,
    /// The normalization policy applied to output vectors.
    pub normalization: Normalization,
}

impl std::fmt::Display for EmbeddingIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.model, self.normalization)
    }
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface and must be deterministic: identical configuration and input
/// text produce identical vectors. The default
/// [`embed_batch`](EmbeddingProvider::embed_batch) implementation calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends that support
/// native batching should override it.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Return the identity (model name + normalization policy) of this provider.
    fn identity(&self) -> EmbeddingIdentity;
}
