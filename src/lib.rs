//! # crag
//!
//! Corrective retrieval-augmented generation: answer a question by
//! retrieving supporting chunks from a persistent vector index, grading
//! whether they actually support an answer, rewriting the query when they
//! do not, and generating a grounded answer — all inside a bounded
//! state-machine loop.
//!
//! ## Overview
//!
//! The crate has two halves:
//!
//! - **Index pipeline** — [`DocumentLoader`] reads raw documents,
//!   [`TextChunker`] splits them into overlapping chunks, and
//!   [`VectorIndex`] embeds, persists, reloads, and searches them with the
//!   same [`EmbeddingProvider`] at build time and query time.
//! - **Workflow engine** — [`WorkflowEngine`] drives the
//!   retrieve → grade → decide → (generate | rewrite) cycle with an
//!   explicit iteration bound, composing a [`RelevanceGrader`],
//!   [`QueryRewriter`], and [`AnswerGenerator`] over any [`LanguageModel`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crag::{
//!     AnswerGenerator, DocumentLoader, PipelineConfig, QueryRewriter,
//!     RelevanceGrader, TextChunker, VectorIndex, WorkflowEngine,
//! };
//! use crag::mock::{MockEmbedding, MockLm};
//!
//! # async fn run() -> crag::Result<()> {
//! let config = PipelineConfig::default();
//!
//! let documents = DocumentLoader::new().load("notes.txt".as_ref())?;
//! let chunks = TextChunker::new(config.chunk_size, config.chunk_overlap).split(&documents);
//!
//! let embedder = Arc::new(MockEmbedding::new(256));
//! let index = Arc::new(VectorIndex::new(embedder));
//! index.build(&chunks).await?;
//!
//! let model: Arc<dyn crag::LanguageModel> = Arc::new(MockLm::new("yes"));
//! let engine = WorkflowEngine::new(
//!     index,
//!     RelevanceGrader::new(model.clone()),
//!     QueryRewriter::new(model.clone()),
//!     AnswerGenerator::new(model),
//!     config,
//! );
//!
//! let outcome = engine.invoke("Central limit theorem").await?;
//! println!("{}", outcome.generation);
//! # Ok(())
//! # }
//! ```
//!
//! Real backends live behind the `openai` feature
//! ([`openai::OpenAiEmbedding`], [`openai::OpenAiChatModel`]); the `cli`
//! feature adds the `crag` binary with `ingest` and `ask` subcommands.

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod grader;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;
pub mod rewriter;
pub mod workflow;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::{EmbeddingIdentity, EmbeddingProvider, Normalization};
pub use error::{CragError, Result};
pub use generator::AnswerGenerator;
pub use grader::{Grade, RelevanceGrader};
pub use index::VectorIndex;
pub use ingest::{DocumentLoader, TextChunker};
pub use llm::LanguageModel;
pub use rewriter::QueryRewriter;
pub use workflow::{WorkflowEngine, WorkflowOutcome, WorkflowPhase, WorkflowState};
