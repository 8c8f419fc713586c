//! Deterministic in-process implementations for tests and offline runs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embedding::{EmbeddingIdentity, EmbeddingProvider, Normalization};
use crate::error::Result;
use crate::llm::LanguageModel;

/// A deterministic bag-of-words embedder.
///
/// Each lowercased alphanumeric token is hashed into one of `dimensions`
/// slots and the resulting count vector is L2-normalized. Texts sharing
/// tokens score high under cosine similarity, which is enough to exercise
/// retrieval ordering without a model backend.
#[derive(Debug, Clone)]
pub struct MockEmbedding {
    dimensions: usize,
    model: String,
}

impl MockEmbedding {
    /// Create a mock embedder with the given output dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, model: "mock-token-hash".to_string() }
    }

    /// Override the reported model name (for identity-mismatch tests).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let slot = (hasher.finish() as usize) % self.dimensions;
            vector[slot] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn identity(&self) -> EmbeddingIdentity {
        EmbeddingIdentity { model: self.model.clone(), normalization: Normalization::UnitL2 }
    }
}

/// A language model that always returns a fixed response and counts calls.
pub struct MockLm {
    response: String,
    calls: AtomicUsize,
}

impl MockLm {
    /// Create a mock model that answers every completion with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self { response: response.into(), calls: AtomicUsize::new(0) }
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for MockLm {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock-lm"
    }
}
