//! Command-line entry points: offline index building and one-shot questions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crag::openai::{OpenAiChatModel, OpenAiEmbedding};
use crag::{
    AnswerGenerator, DocumentLoader, LanguageModel, PipelineConfig, QueryRewriter,
    RelevanceGrader, TextChunker, VectorIndex, WorkflowEngine,
};

#[derive(Parser)]
#[command(name = "crag", version, about = "Corrective RAG over a local document index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a vector index from a document file or directory and persist it.
    Ingest {
        /// Document file, or flat directory of text files.
        source: PathBuf,
        /// Directory to persist the index into.
        #[arg(long, default_value = "crag_index")]
        index: PathBuf,
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,
        #[arg(long, default_value_t = 200)]
        chunk_overlap: usize,
        /// Embedding model name.
        #[arg(long)]
        embedding_model: Option<String>,
    },
    /// Ask a single question against a persisted index.
    Ask {
        question: String,
        /// Directory holding the persisted index.
        #[arg(long, default_value = "crag_index")]
        index: PathBuf,
        #[arg(long, default_value_t = 4)]
        top_k: usize,
        #[arg(long, default_value_t = 2)]
        max_iterations: usize,
        /// Embedding model name (must match the one used at ingest time).
        #[arg(long)]
        embedding_model: Option<String>,
        /// Chat model name.
        #[arg(long)]
        chat_model: Option<String>,
    },
}

fn embedder(model: Option<String>) -> anyhow::Result<OpenAiEmbedding> {
    let mut embedder = OpenAiEmbedding::from_env().context("embedding backend")?;
    if let Some(model) = model {
        embedder = embedder.with_model(model);
    }
    Ok(embedder)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Ingest { source, index, chunk_size, chunk_overlap, embedding_model } => {
            let config = PipelineConfig::builder()
                .chunk_size(chunk_size)
                .chunk_overlap(chunk_overlap)
                .build()?;

            let documents = DocumentLoader::new().load(&source)?;
            let chunks =
                TextChunker::new(config.chunk_size, config.chunk_overlap).split(&documents);

            let vector_index = VectorIndex::new(Arc::new(embedder(embedding_model)?));
            vector_index.build(&chunks).await?;
            vector_index.persist(&index).await?;

            println!(
                "Indexed {} document(s) as {} chunk(s) into {}",
                documents.len(),
                chunks.len(),
                index.display()
            );
        }
        Command::Ask { question, index, top_k, max_iterations, embedding_model, chat_model } => {
            let config = PipelineConfig::builder()
                .top_k(top_k)
                .max_iterations(max_iterations)
                .build()?;

            let vector_index =
                Arc::new(VectorIndex::load(&index, Arc::new(embedder(embedding_model)?))?);

            let mut chat = OpenAiChatModel::from_env().context("chat backend")?;
            if let Some(model) = chat_model {
                chat = chat.with_model(model);
            }
            let model: Arc<dyn LanguageModel> = Arc::new(chat);

            let engine = WorkflowEngine::new(
                vector_index,
                RelevanceGrader::new(model.clone()),
                QueryRewriter::new(model.clone()),
                AnswerGenerator::new(model),
                config,
            );

            let outcome = engine.invoke(&question).await?;
            println!("{}", outcome.generation);
        }
    }

    Ok(())
}
