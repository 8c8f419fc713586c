//! Configuration for the retrieval and workflow layers.

use serde::{Deserialize, Serialize};

use crate::error::{CragError, Result};

/// Configuration parameters shared by ingestion, retrieval, and the workflow engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results to return from vector search.
    pub top_k: usize,
    /// Maximum number of rewrite-and-retry cycles before generation is forced.
    pub max_iterations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 4, max_iterations: 2 }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from vector search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum number of rewrite-and-retry cycles.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.config.max_iterations = iterations;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`CragError::Config`] if:
    /// - `chunk_overlap == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_iterations == 0`
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.chunk_overlap == 0 {
            return Err(CragError::Config(
                "chunk_overlap must be greater than zero".to_string(),
            ));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(CragError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(CragError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_iterations == 0 {
            return Err(CragError::Config("max_iterations must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.chunk_overlap < config.chunk_size);
        assert!(config.top_k > 0);
        assert!(config.max_iterations > 0);
    }

    #[test]
    fn builder_rejects_overlap_not_less_than_size() {
        let result = PipelineConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(result, Err(CragError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_overlap() {
        let result = PipelineConfig::builder().chunk_size(100).chunk_overlap(0).build();
        assert!(matches!(result, Err(CragError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let result = PipelineConfig::builder().top_k(0).build();
        assert!(matches!(result, Err(CragError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_max_iterations() {
        let result = PipelineConfig::builder().max_iterations(0).build();
        assert!(matches!(result, Err(CragError::Config(_))));
    }
}
