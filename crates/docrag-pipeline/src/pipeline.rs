//! The RAG pipeline orchestrator.

use docrag_core::{
    ChatMessage, EmbeddingProvider, Error, FileType, IngestError, IngestStage, IngestionReport,
    IndexPoint, LlmProvider, Page, QueryOutcome, Result, Settings, SourceRef, VectorIndex,
};
use docrag_chunker::TokenSplitter;
use docrag_extract::extractor_for;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::embedder::DocumentEmbedder;
use crate::generator::AnswerGenerator;
use crate::prompts::truncate_chars;
use crate::retriever::Retriever;

/// Canned answer returned when retrieval finds nothing relevant. The
/// generator is never called in that case.
pub const FALLBACK_ANSWER: &str =
    "I don't have enough information in the uploaded documents to answer this.";

/// Characters of chunk content exposed in a citation preview.
const SOURCE_PREVIEW_CHARS: usize = 300;

/// Sequences ingestion (extract → chunk → embed → index) and querying
/// (retrieve → generate) against one vector index.
///
/// A pipeline holds no shared mutable state; constructing one per request
/// from the same configuration snapshot is cheap and safe.
pub struct RagPipeline {
    index: Arc<dyn VectorIndex>,
    splitter: TokenSplitter,
    embedder: Arc<DocumentEmbedder>,
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl RagPipeline {
    /// Build a pipeline from a configuration snapshot and the external
    /// service handles.
    pub fn new(
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
        embedding: Arc<dyn EmbeddingProvider>,
        settings: &Settings,
    ) -> Result<Self> {
        let splitter = TokenSplitter::new(settings.rag.chunk_size, settings.rag.chunk_overlap)?;
        let embedder = Arc::new(DocumentEmbedder::new(
            embedding,
            settings.embedding.batch_size,
        ));
        let retriever = Retriever::new(
            Arc::clone(&index),
            Arc::clone(&embedder),
            settings.rag.clone(),
        );
        let generator = AnswerGenerator::new(llm, &settings.llm);

        Ok(Self {
            index,
            splitter,
            embedder,
            retriever,
            generator,
        })
    }

    /// Ingest a document file: extract → chunk → embed → index.
    ///
    /// Fail-fast: the first stage error propagates as an [`IngestError`]
    /// naming the stage; nothing is caught and continued.
    pub async fn ingest_document(
        &self,
        path: &Path,
        file_type: FileType,
        document_id: &str,
        document_name: &str,
    ) -> std::result::Result<IngestionReport, IngestError> {
        info!(document = document_name, %file_type, "starting ingestion");

        let extractor = extractor_for(file_type);
        let extraction = extractor
            .extract(path)
            .await
            .map_err(|e| IngestError::new(IngestStage::Extract, e))?;

        info!(
            document = document_name,
            pages = extraction.total_pages,
            "extracted pages"
        );

        self.ingest_pages(
            &extraction.pages,
            extraction.total_pages,
            document_id,
            document_name,
        )
        .await
    }

    /// Ingest already-extracted pages. Used by [`Self::ingest_document`] and
    /// by callers that run extraction separately.
    pub async fn ingest_pages(
        &self,
        pages: &[Page],
        total_pages: u32,
        document_id: &str,
        document_name: &str,
    ) -> std::result::Result<IngestionReport, IngestError> {
        let chunks = self.splitter.chunk_pages(pages, document_id, document_name);
        info!(
            document = document_name,
            chunks = chunks.len(),
            "chunked document"
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self
            .embedder
            .embed_texts(&texts)
            .await
            .map_err(|e| IngestError::new(IngestStage::Embed, e))?;

        let points: Vec<IndexPoint> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, vector)| IndexPoint {
                id: Uuid::new_v4(),
                vector,
                payload: chunk.into(),
            })
            .collect();

        self.index
            .ensure_collection(self.embedder.dimension())
            .await
            .map_err(|e| IngestError::new(IngestStage::Index, e))?;
        self.index
            .upsert(points)
            .await
            .map_err(|e| IngestError::new(IngestStage::Index, e))?;

        info!(
            document = document_name,
            vectors = chunks.len(),
            "stored vectors"
        );

        Ok(IngestionReport {
            chunk_count: chunks.len() as u32,
            page_count: total_pages,
            chunks,
        })
    }

    /// Answer a question from indexed content.
    ///
    /// Empty retrieval short-circuits to the canned fallback with zero
    /// token usage and no sources, avoiding a pointless (and hallucination
    /// prone) LLM call. Everything else propagates.
    pub async fn query(
        &self,
        question: &str,
        chat_history: &[ChatMessage],
        top_k: Option<usize>,
        score_threshold: Option<f32>,
        document_filter: Option<Vec<String>>,
    ) -> Result<QueryOutcome> {
        let chunks = self
            .retriever
            .retrieve(question, top_k, score_threshold, document_filter)
            .await?;

        if chunks.is_empty() {
            info!("no relevant chunks; returning fallback answer");
            return Ok(QueryOutcome {
                answer: FALLBACK_ANSWER.to_string(),
                sources: Vec::new(),
                model_used: self.generator.model_name().to_string(),
                tokens_used: Default::default(),
            });
        }

        let result = self
            .generator
            .generate(question, &chunks, chat_history)
            .await
            .map_err(Error::from)?;

        let sources: Vec<SourceRef> = chunks
            .iter()
            .map(|chunk| SourceRef {
                document_id: chunk.document_id.clone(),
                document_name: chunk.document_name.clone(),
                page_number: chunk.page_number,
                chunk_text: truncate_chars(&chunk.content, SOURCE_PREVIEW_CHARS),
                relevance_score: chunk.relevance_score,
            })
            .collect();

        info!(
            sources = sources.len(),
            tokens = result.tokens_used.total,
            "generated answer"
        );

        Ok(QueryOutcome {
            answer: result.answer,
            sources,
            model_used: result.model_used,
            tokens_used: result.tokens_used,
        })
    }
}
