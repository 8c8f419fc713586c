//! The adaptive retrieval-and-generation workflow engine.
//!
//! [`WorkflowEngine`] is an explicit finite-state machine over
//! [`WorkflowPhase`]: retrieve → grade → decide → (generate | rewrite →
//! retrieve), bounded by `max_iterations`. Each invocation threads a fresh
//! [`WorkflowState`] through the loop; nothing survives across invocations.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::document::Chunk;
use crate::error::Result;
use crate::generator::AnswerGenerator;
use crate::grader::RelevanceGrader;
use crate::index::VectorIndex;
use crate::rewriter::QueryRewriter;

/// Reply produced when the iteration bound is reached with no relevant evidence.
const NO_EVIDENCE_REPLY: &str =
    "I could not find supporting material for that question in the indexed documents.";

/// The states of the workflow state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    /// Query the vector index with the current query.
    Retrieve,
    /// Grade every retrieved chunk against the current query.
    Grade,
    /// Route to generation or another rewrite pass.
    Decide,
    /// Reformulate the current query and retry retrieval.
    Rewrite,
    /// Produce the final answer from the relevant evidence.
    Generate,
    /// Terminal: the generation is ready to return.
    Done,
}

/// The mutable record threaded through one workflow execution.
///
/// Owned exclusively by a single [`WorkflowEngine::invoke`] call and
/// discarded once the answer is returned.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    /// The original question as asked.
    pub question: String,
    /// The current (possibly rewritten) query.
    pub query: String,
    /// Chunks retrieved in the most recent pass.
    pub documents: Vec<Chunk>,
    /// Chunks graded relevant in the most recent pass.
    pub relevant: Vec<Chunk>,
    /// Number of rewrite cycles performed so far.
    pub iteration: usize,
    /// The final answer, set by the generate step.
    pub generation: Option<String>,
}

impl WorkflowState {
    /// Seed a fresh state from an incoming question.
    pub fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            query: question.to_string(),
            documents: Vec::new(),
            relevant: Vec::new(),
            iteration: 0,
            generation: None,
        }
    }
}

/// The result of one workflow invocation.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    /// The final answer text.
    pub generation: String,
    /// The evidence chunks the answer was grounded in.
    pub documents: Vec<Chunk>,
}

/// Orchestrates retrieval, grading, rewriting, and generation.
///
/// All collaborators are injected at construction; the engine holds no
/// global state and is safe to share across concurrent invocations, each of
/// which owns its own [`WorkflowState`].
pub struct WorkflowEngine {
    index: Arc<VectorIndex>,
    grader: RelevanceGrader,
    rewriter: QueryRewriter,
    generator: AnswerGenerator,
    config: PipelineConfig,
}

impl WorkflowEngine {
    /// Create an engine from its collaborators and configuration.
    pub fn new(
        index: Arc<VectorIndex>,
        grader: RelevanceGrader,
        rewriter: QueryRewriter,
        generator: AnswerGenerator,
        config: PipelineConfig,
    ) -> Self {
        Self { index, grader, rewriter, generator, config }
    }

    /// Answer a question, returning the generation and its evidence.
    ///
    /// Terminates within `max_iterations + 1` retrieval passes regardless of
    /// grader or rewriter behavior.
    pub async fn invoke(&self, question: &str) -> Result<WorkflowOutcome> {
        let mut state = WorkflowState::new(question);
        let mut phase = WorkflowPhase::Retrieve;

        loop {
            phase = match phase {
                WorkflowPhase::Retrieve => self.retrieve(&mut state).await?,
                WorkflowPhase::Grade => self.grade(&mut state).await?,
                WorkflowPhase::Decide => self.decide(&state),
                WorkflowPhase::Rewrite => self.rewrite(&mut state).await?,
                WorkflowPhase::Generate => self.generate(&mut state).await?,
                WorkflowPhase::Done => break,
            };
        }

        let generation = match state.generation.take() {
            Some(generation) => generation,
            None => NO_EVIDENCE_REPLY.to_string(),
        };

        info!(iterations = state.iteration, evidence = state.relevant.len(), "workflow done");
        Ok(WorkflowOutcome { generation, documents: state.relevant })
    }

    async fn retrieve(&self, state: &mut WorkflowState) -> Result<WorkflowPhase> {
        debug!(query = %state.query, iteration = state.iteration, "retrieving");
        let results = self.index.retrieve(&state.query, self.config.top_k).await?;
        state.documents = results.into_iter().map(|r| r.chunk).collect();
        Ok(WorkflowPhase::Grade)
    }

    async fn grade(&self, state: &mut WorkflowState) -> Result<WorkflowPhase> {
        // Per-chunk grades are independent; run them concurrently and wait for all.
        let grades = join_all(
            state.documents.iter().map(|chunk| self.grader.grade(&state.query, chunk)),
        )
        .await;

        let mut relevant = Vec::new();
        for (chunk, grade) in state.documents.iter().zip(grades) {
            if grade?.is_relevant() {
                relevant.push(chunk.clone());
            }
        }

        debug!(retrieved = state.documents.len(), relevant = relevant.len(), "graded chunks");
        state.relevant = relevant;
        Ok(WorkflowPhase::Decide)
    }

    fn decide(&self, state: &WorkflowState) -> WorkflowPhase {
        if !state.relevant.is_empty() {
            WorkflowPhase::Generate
        } else if state.iteration < self.config.max_iterations {
            debug!(iteration = state.iteration, "no relevant evidence, rewriting");
            WorkflowPhase::Rewrite
        } else {
            warn!(
                iteration = state.iteration,
                "iteration bound reached with no relevant evidence, forcing generation"
            );
            WorkflowPhase::Generate
        }
    }

    async fn rewrite(&self, state: &mut WorkflowState) -> Result<WorkflowPhase> {
        state.query = self.rewriter.rewrite(&state.query).await?;
        state.iteration += 1;
        Ok(WorkflowPhase::Retrieve)
    }

    async fn generate(&self, state: &mut WorkflowState) -> Result<WorkflowPhase> {
        let generation = if state.relevant.is_empty() {
            // Forced generation after the bound: answer honestly rather than
            // invoke the generator with nothing to ground on.
            NO_EVIDENCE_REPLY.to_string()
        } else {
            self.generator.generate(&state.query, &state.relevant).await?
        };

        state.generation = Some(generation);
        Ok(WorkflowPhase::Done)
    }
}
