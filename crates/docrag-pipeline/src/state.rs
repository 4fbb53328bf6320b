//! Document and conversation state.
//!
//! The relational store behind [`DocumentStore`] is an external collaborator;
//! [`MemoryDocumentStore`] implements the boundary in memory for tests, the
//! CLI, and development. [`ConversationLog`] keeps an ordered message list
//! and hands the generator a bounded trailing history window.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docrag_core::{
    ChatMessage, ChatRole, Chunk, DocumentRecord, DocumentStatus, DocumentStore, QueryOutcome,
    SourceRef, StoreError, TokenUsage,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

// ============================================================================
// Document store
// ============================================================================

/// In-memory implementation of the document persistence boundary.
pub struct MemoryDocumentStore {
    records: Arc<RwLock<HashMap<Uuid, DocumentRecord>>>,
    chunks: Arc<RwLock<HashMap<Uuid, Vec<Chunk>>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            chunks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, record: DocumentRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        debug!(id = %record.id, name = %record.name, "created document record");
        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        let mut all: Vec<DocumentRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn find_by_hash(&self, file_hash: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.file_hash == file_hash)
            .cloned())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        chunk_count: u32,
        page_count: u32,
        error_message: Option<String>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if !record.status.can_transition(status) {
            return Err(StoreError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }

        record.status = status;
        record.chunk_count = chunk_count;
        record.page_count = page_count;
        record.error_message = match status {
            DocumentStatus::Failed => error_message,
            _ => None,
        };
        record.updated_at = Utc::now();

        debug!(%id, %status, "document status updated");
        Ok(())
    }

    async fn store_chunks(&self, id: Uuid, chunks: &[Chunk]) -> Result<(), StoreError> {
        let mut stored = self.chunks.write().await;
        stored.insert(id, chunks.to_vec());
        Ok(())
    }

    async fn get_chunks(&self, id: Uuid) -> Result<Vec<Chunk>, StoreError> {
        let stored = self.chunks.read().await;
        let mut chunks = stored.get(&id).cloned().unwrap_or_default();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let mut chunks = self.chunks.write().await;
        chunks.remove(&id);
        Ok(records.remove(&id).is_some())
    }
}

// ============================================================================
// Conversations
// ============================================================================

/// A stored conversation message. Only assistant messages carry sources,
/// model, and token usage.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub role: ChatRole,
    pub content: String,
    pub sources: Vec<SourceRef>,
    pub model_used: Option<String>,
    pub tokens_used: Option<TokenUsage>,
    pub created_at: DateTime<Utc>,
}

/// An ordered conversation with a bounded history view.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    pub id: Uuid,
    pub title: String,
    messages: Vec<StoredMessage>,
}

impl ConversationLog {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(StoredMessage {
            role: ChatRole::User,
            content: content.into(),
            sources: Vec::new(),
            model_used: None,
            tokens_used: None,
            created_at: Utc::now(),
        });
    }

    /// Append an assistant message from a query outcome, carrying its
    /// citations and token accounting.
    pub fn push_assistant(&mut self, outcome: &QueryOutcome) {
        self.messages.push(StoredMessage {
            role: ChatRole::Assistant,
            content: outcome.answer.clone(),
            sources: outcome.sources.clone(),
            model_used: Some(outcome.model_used.clone()),
            tokens_used: Some(outcome.tokens_used),
            created_at: Utc::now(),
        });
    }

    /// The most recent `limit` messages in chronological order, shaped for
    /// the generator.
    pub fn history(&self, limit: usize) -> Vec<ChatMessage> {
        let start = self.messages.len().saturating_sub(limit);
        self.messages[start..]
            .iter()
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    /// All stored messages in order.
    pub fn messages(&self) -> &[StoredMessage] {
        &self.messages
    }
}
