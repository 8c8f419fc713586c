//! The vector index: build, persist, load, retrieve.
//!
//! [`VectorIndex`] owns the chunk-to-embedding mapping and answers top-k
//! similarity queries by cosine score. It persists to a self-describing
//! directory (a manifest plus the serialized entries) and refuses to reload
//! under an embedding provider whose dimensionality or identity differs from
//! the one that built it.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::{EmbeddingProvider, Normalization};
use crate::error::{CragError, Result};

const MANIFEST_FILE: &str = "manifest.json";
const ENTRIES_FILE: &str = "index.json";
const FORMAT_VERSION: u32 = 1;

/// On-disk description of a persisted index, checked at load time.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    format_version: u32,
    model: String,
    normalization: Normalization,
    dimensions: usize,
    entries: usize,
}

/// One indexed chunk with the embedding produced for it at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// A searchable index over chunk embeddings.
///
/// Reads (`retrieve`, `persist`) take a shared lock and may run
/// concurrently; `build` takes the exclusive lock only to swap in the new
/// entries. The bound [`EmbeddingProvider`] is used for every chunk at build
/// time and for every query, keeping the embedding space consistent.
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Option<Vec<IndexEntry>>>,
}

impl VectorIndex {
    /// Create an empty, uninitialized index bound to an embedding provider.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, entries: RwLock::new(None) }
    }

    /// Embed every chunk and construct the index.
    ///
    /// # Errors
    ///
    /// Returns [`CragError::EmptyCorpus`] if `chunks` is empty, or an
    /// embedding error from the provider.
    pub async fn build(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Err(CragError::EmptyCorpus);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        let count = entries.len();
        *self.entries.write().await = Some(entries);

        info!(chunks = count, model = %self.embedder.identity(), "index built");
        Ok(())
    }

    /// Persist the index to a self-contained directory, creating parent
    /// directories as needed.
    ///
    /// The directory holds a manifest (format version, embedding identity,
    /// dimensionality, entry count) and the serialized entries, which is
    /// sufficient for an exact reload.
    ///
    /// # Errors
    ///
    /// Returns [`CragError::NotBuilt`] if called before [`build`](Self::build),
    /// or [`CragError::Persist`] on a filesystem failure.
    pub async fn persist(&self, path: &Path) -> Result<()> {
        let guard = self.entries.read().await;
        let entries = guard.as_ref().ok_or(CragError::NotBuilt)?;

        fs::create_dir_all(path).map_err(|e| persist_err(path, &e))?;

        let identity = self.embedder.identity();
        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            model: identity.model,
            normalization: identity.normalization,
            dimensions: self.embedder.dimensions(),
            entries: entries.len(),
        };

        write_json(&path.join(MANIFEST_FILE), &manifest)?;
        write_json(&path.join(ENTRIES_FILE), entries)?;

        info!(path = %path.display(), entries = entries.len(), "index persisted");
        Ok(())
    }

    /// Load a persisted index, validating it against the supplied provider.
    ///
    /// # Errors
    ///
    /// - [`CragError::NotFound`] if `path` does not exist.
    /// - [`CragError::DimensionMismatch`] if the provider's dimensionality
    ///   differs from the manifest.
    /// - [`CragError::ModelMismatch`] if the provider's model name or
    ///   normalization policy differs from the one recorded at build time.
    /// - [`CragError::Persist`] if the directory contents cannot be read,
    ///   or the entry list does not match the count the manifest records.
    pub fn load(path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        if !path.exists() {
            return Err(CragError::NotFound { path: path.to_path_buf() });
        }

        let manifest: Manifest = read_json(&path.join(MANIFEST_FILE))?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(CragError::Persist {
                path: path.to_path_buf(),
                message: format!("unsupported index format version {}", manifest.format_version),
            });
        }

        if manifest.dimensions != embedder.dimensions() {
            return Err(CragError::DimensionMismatch {
                expected: manifest.dimensions,
                actual: embedder.dimensions(),
            });
        }

        let identity = embedder.identity();
        if manifest.model != identity.model || manifest.normalization != identity.normalization {
            return Err(CragError::ModelMismatch {
                expected: format!("{} ({:?})", manifest.model, manifest.normalization),
                actual: identity.to_string(),
            });
        }

        let entries: Vec<IndexEntry> = read_json(&path.join(ENTRIES_FILE))?;
        if entries.len() != manifest.entries {
            return Err(CragError::Persist {
                path: path.to_path_buf(),
                message: format!(
                    "manifest records {} entries but the index holds {}",
                    manifest.entries,
                    entries.len()
                ),
            });
        }

        info!(path = %path.display(), entries = entries.len(), "index loaded");
        Ok(Self { embedder, entries: RwLock::new(Some(entries)) })
    }

    /// Embed the query and return the `k` most similar chunks, highest
    /// similarity first. Returns fewer than `k` results only if the corpus
    /// has fewer chunks.
    ///
    /// # Errors
    ///
    /// Returns [`CragError::NotInitialized`] if the index was neither built
    /// nor loaded, or an embedding error from the provider.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.read().await.is_none() {
            return Err(CragError::NotInitialized);
        }

        let query_embedding = self.embedder.embed(query).await?;

        let guard = self.entries.read().await;
        let entries = guard.as_ref().ok_or(CragError::NotInitialized)?;

        let mut scored: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, &query_embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        debug!(k, returned = scored.len(), "retrieved chunks");
        Ok(scored)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| persist_err(path, &e))?;
    fs::write(path, bytes).map_err(|e| persist_err(path, &e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| persist_err(path, &e))?;
    serde_json::from_slice(&bytes).map_err(|e| persist_err(path, &e))
}

fn persist_err(path: &Path, err: &dyn std::fmt::Display) -> CragError {
    CragError::Persist { path: path.to_path_buf(), message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.6f32, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
