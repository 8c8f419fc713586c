//! Language-model capability contract.

use async_trait::async_trait;

use crate::error::Result;

/// A language model that completes a prompt into text.
///
/// The grader, rewriter, and generator all depend on this single seam, so
/// any backend (hosted API, local model, scripted mock) can drive the whole
/// workflow. Calls may block on network or compute; the contract is one
/// finished completion per call, no streaming.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion with a system instruction and a user prompt.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Return the model name for logging and error reporting.
    fn name(&self) -> &str;
}
