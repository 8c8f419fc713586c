//! Grounded answer generation from graded evidence.

use std::sync::Arc;

use tracing::debug;

use crate::document::Chunk;
use crate::error::{CragError, Result};
use crate::llm::LanguageModel;

const GENERATOR_SYSTEM_PROMPT: &str = "You answer questions using only the provided \
context. If the context does not contain the answer, say that you do not know.";

/// Produces a final answer grounded in the supplied evidence chunks.
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
}

impl AnswerGenerator {
    /// Create a generator backed by the given language model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Generate an answer to `query` from the evidence chunks.
    ///
    /// # Errors
    ///
    /// Returns [`CragError::InsufficientEvidence`] if `evidence` is empty.
    /// The workflow engine never calls this without evidence; the guard is
    /// here so no other caller can either.
    pub async fn generate(&self, query: &str, evidence: &[Chunk]) -> Result<String> {
        if evidence.is_empty() {
            return Err(CragError::InsufficientEvidence);
        }

        let context: String =
            evidence.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n\n");

        let prompt = format!("Context:\n{context}\n\nQuestion: {query}\n\nAnswer:");

        let answer = self.model.complete(GENERATOR_SYSTEM_PROMPT, &prompt).await?;

        debug!(evidence = evidence.len(), answer_len = answer.len(), "generated answer");
        Ok(answer.trim().to_string())
    }
}
