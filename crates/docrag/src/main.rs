//! # docrag CLI
//!
//! Command-line interface for docrag, a retrieval-augmented document Q&A
//! pipeline.
//!
//! ## Commands
//!
//! - `docrag ingest <FILE>` - Extract, chunk, embed, and index a document
//! - `docrag ask <QUESTION>` - Answer a question from indexed documents
//! - `docrag status` - Show how many vectors the index holds
//! - `docrag delete <DOCUMENT_ID>` - Remove a document's vectors
//!
//! ## Examples
//!
//! ```bash
//! # Ingest a PDF
//! docrag ingest report.pdf
//!
//! # Ask across everything indexed
//! docrag ask "what were the Q3 revenue drivers?"
//!
//! # Scope a question to specific documents
//! docrag ask "what changed?" --document <id> --document <id>
//! ```
//!
//! Document records live in process memory; the vector index (Qdrant) is the
//! durable side. Wire a real store implementation for multi-process use.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use docrag_core::{DocumentStore, FileType, Settings, VectorIndex};
use docrag_extract::extractor_for_tag;
use docrag_index::QdrantIndex;
use docrag_pipeline::{DocumentManager, MemoryDocumentStore, RagPipeline};
use docrag_providers::{embedding_provider, llm_provider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod config;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Document Q&A over a RAG pipeline", version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a document into the index
    Ingest {
        /// File to ingest
        file: PathBuf,

        /// File type tag (pdf|docx|txt|md); inferred from the extension
        /// when omitted
        #[arg(long)]
        file_type: Option<String>,

        /// Display name; defaults to the file name
        #[arg(long)]
        name: Option<String>,
    },

    /// Ask a question against indexed documents
    Ask {
        /// The question
        question: String,

        /// Restrict retrieval to these document ids (repeatable; any match)
        #[arg(long = "document")]
        documents: Vec<String>,

        /// Maximum chunks to retrieve
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Show index statistics
    Status,

    /// Delete a document's vectors from the index
    Delete {
        /// Document id
        document_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = config::load(cli.config)?;

    match cli.command {
        Commands::Ingest {
            file,
            file_type,
            name,
        } => ingest(&settings, file, file_type, name).await,
        Commands::Ask {
            question,
            documents,
            top_k,
        } => ask(&settings, &question, documents, top_k).await,
        Commands::Status => status(&settings).await,
        Commands::Delete { document_id } => delete(&settings, document_id).await,
    }
}

fn build_index(settings: &Settings) -> Result<Arc<QdrantIndex>> {
    Ok(Arc::new(QdrantIndex::new(&settings.index)?))
}

fn build_pipeline(settings: &Settings, index: Arc<QdrantIndex>) -> Result<Arc<RagPipeline>> {
    let llm = llm_provider(&settings.llm)?;
    let embedding = embedding_provider(&settings.embedding)?;
    Ok(Arc::new(RagPipeline::new(index, llm, embedding, settings)?))
}

async fn ingest(
    settings: &Settings,
    file: PathBuf,
    file_type: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let tag = match file_type {
        Some(tag) => tag,
        None => file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("cannot infer file type; pass --file-type"))?,
    };
    // Fails fast on an unsupported tag before any work starts.
    let file_type = extractor_for_tag(&tag).map(|e| e.format())?;

    let name = name.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    });

    let index = build_index(settings)?;
    let pipeline = build_pipeline(settings, Arc::clone(&index))?;
    let store = Arc::new(MemoryDocumentStore::new());
    let manager = DocumentManager::new(store.clone(), index, pipeline);

    let record = manager
        .register(&file, &name, file_type)
        .await
        .context("failed to register document")?;
    manager
        .process(record.id, &file)
        .await
        .context("ingestion failed")?;

    let record = store
        .get(record.id)
        .await?
        .ok_or_else(|| anyhow!("document record vanished"))?;

    println!("Ingested {} ({})", record.name, record.id);
    println!("  pages:  {}", record.page_count);
    println!("  chunks: {}", record.chunk_count);
    Ok(())
}

async fn ask(
    settings: &Settings,
    question: &str,
    documents: Vec<String>,
    top_k: Option<usize>,
) -> Result<()> {
    let index = build_index(settings)?;
    let pipeline = build_pipeline(settings, index)?;

    let filter = if documents.is_empty() {
        None
    } else {
        Some(documents)
    };

    // Each CLI invocation is a single-turn conversation.
    let outcome = pipeline.query(question, &[], top_k, None, filter).await?;

    println!("{}", outcome.answer);
    if !outcome.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &outcome.sources {
            match source.page_number {
                Some(page) => println!(
                    "  - {} (page {}, score {:.3})",
                    source.document_name, page, source.relevance_score
                ),
                None => println!(
                    "  - {} (score {:.3})",
                    source.document_name, source.relevance_score
                ),
            }
        }
    }
    println!();
    println!(
        "[{} | tokens: {} prompt / {} completion / {} total]",
        outcome.model_used,
        outcome.tokens_used.prompt,
        outcome.tokens_used.completion,
        outcome.tokens_used.total
    );
    Ok(())
}

async fn status(settings: &Settings) -> Result<()> {
    let index = build_index(settings)?;
    let count = index.count().await?;
    println!("collection: {}", settings.index.collection);
    println!("vectors:    {count}");
    Ok(())
}

async fn delete(settings: &Settings, document_id: Uuid) -> Result<()> {
    let index = build_index(settings)?;
    index.delete_by_document(&document_id.to_string()).await?;
    println!("Deleted vectors for {document_id}");
    Ok(())
}
