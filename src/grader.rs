//! Binary relevance grading of retrieved chunks.

use std::sync::Arc;

use tracing::debug;

use crate::document::Chunk;
use crate::error::Result;
use crate::llm::LanguageModel;

const GRADER_SYSTEM_PROMPT: &str = "You are a grader assessing whether a retrieved passage \
is relevant to a user question. Answer with a single word: yes or no.";

/// A binary relevance judgment for one (query, chunk) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    /// The chunk supports answering the query.
    Relevant,
    /// The chunk does not support answering the query.
    NotRelevant,
}

impl Grade {
    /// Returns `true` for [`Grade::Relevant`].
    pub fn is_relevant(self) -> bool {
        matches!(self, Grade::Relevant)
    }
}

/// Classifies whether a retrieved chunk supports a query, using a language model.
///
/// Grading is stateless: each call depends only on the (query, chunk text)
/// pair. Ambiguous model responses are treated as not relevant, since
/// admitting irrelevant evidence corrupts generation silently while
/// rejecting borderline evidence only costs an extra iteration.
pub struct RelevanceGrader {
    model: Arc<dyn LanguageModel>,
}

impl RelevanceGrader {
    /// Create a grader backed by the given language model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Grade one chunk against the query.
    ///
    /// # Errors
    ///
    /// Propagates a model failure; an unparseable verdict is not an error,
    /// it grades as [`Grade::NotRelevant`].
    pub async fn grade(&self, query: &str, chunk: &Chunk) -> Result<Grade> {
        let prompt = format!(
            "Question: {query}\n\nPassage:\n{}\n\nIs the passage relevant to the question? \
             Answer yes or no.",
            chunk.text
        );

        let verdict = self.model.complete(GRADER_SYSTEM_PROMPT, &prompt).await?;

        let grade = if verdict.trim().to_lowercase().starts_with("yes") {
            Grade::Relevant
        } else {
            Grade::NotRelevant
        };

        debug!(chunk.id = %chunk.id, ?grade, verdict = %verdict.trim(), "graded chunk");
        Ok(grade)
    }
}
