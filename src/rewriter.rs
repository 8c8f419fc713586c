//! Query reformulation for retrieval retries.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::llm::LanguageModel;

const REWRITER_SYSTEM_PROMPT: &str = "You rewrite user questions to improve document \
retrieval. Respond with the rewritten question only, no preamble.";

/// Produces a reformulated query intended to retrieve better evidence.
///
/// The returned query is never identical to the input: a model that echoes
/// the question (or returns a blank) would otherwise leave the retry loop
/// retrieving the same results every pass.
pub struct QueryRewriter {
    model: Arc<dyn LanguageModel>,
}

impl QueryRewriter {
    /// Create a rewriter backed by the given language model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Rewrite the query into a new, non-identical formulation.
    pub async fn rewrite(&self, query: &str) -> Result<String> {
        let prompt = format!(
            "Original question: {query}\n\nRewrite it to be more specific and better \
             suited for searching a document collection."
        );

        let rewritten = self.model.complete(REWRITER_SYSTEM_PROMPT, &prompt).await?;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() || rewritten.eq_ignore_ascii_case(query.trim()) {
            warn!(query, "model echoed the query; deriving a broadened variant");
            return Ok(format!("In other words: {}", query.trim()));
        }

        debug!(from = query, to = rewritten, "rewrote query");
        Ok(rewritten.to_string())
    }
}
