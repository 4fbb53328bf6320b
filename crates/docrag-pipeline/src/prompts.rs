//! Prompt assembly for grounded answering.

use docrag_core::{ChatMessage, ChatRole, RetrievedChunk};

/// Fixed behavior of the answering assistant.
pub const SYSTEM_PROMPT: &str = "\
You are a document Q&A assistant. Answer questions based ONLY on
the provided context. If the answer is not in the context, say
\"I don't have enough information in the uploaded documents to answer this.\"

Always cite your sources using [Source: filename, page X] format.";

/// Most recent conversation turns included in the prompt.
const HISTORY_WINDOW: usize = 10;
/// Character cap per history message, bounding prompt size.
const HISTORY_CHAR_CAP: usize = 500;

/// Truncate to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Citation header for a chunk: `[Source: name, page N]`, page omitted for
/// unpaginated sources.
fn citation_header(chunk: &RetrievedChunk) -> String {
    match chunk.page_number {
        Some(page) => format!("[Source: {}, page {}]", chunk.document_name, page),
        None => format!("[Source: {}]", chunk.document_name),
    }
}

/// Concatenate chunks in the order received (ranked highest-relevance
/// first), each tagged with its citation header.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("{}\n{}", citation_header(chunk), chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Render a bounded trailing window of conversation history.
pub fn build_chat_history(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "No previous conversation.".to_string();
    }

    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    messages[start..]
        .iter()
        .map(|msg| {
            let role = match msg.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{role}: {}", truncate_chars(&msg.content, HISTORY_CHAR_CAP))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full question prompt.
pub fn build_qa_prompt(
    question: &str,
    chunks: &[RetrievedChunk],
    chat_history: &[ChatMessage],
) -> String {
    format!(
        "## Context\n{context}\n\n\
         ## Conversation History\n{history}\n\n\
         ## Question\n{question}\n\n\
         ## Instructions\n\
         - Answer accurately based on the context above\n\
         - Quote relevant passages when helpful\n\
         - Cite every claim with [Source: filename, page X]\n\
         - If multiple documents are relevant, synthesize across them\n\
         - If unsure, say so and never fabricate information",
        context = build_context(chunks),
        history = build_chat_history(chat_history),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(name: &str, page: Option<u32>, content: &str) -> RetrievedChunk {
        RetrievedChunk {
            document_id: "doc-1".to_string(),
            document_name: name.to_string(),
            chunk_index: 0,
            page_number: page,
            content: content.to_string(),
            relevance_score: 0.9,
        }
    }

    #[test]
    fn test_citation_header_with_page() {
        let text = build_context(&[chunk("report.pdf", Some(4), "body")]);
        assert!(text.starts_with("[Source: report.pdf, page 4]\nbody"));
    }

    #[test]
    fn test_citation_header_without_page() {
        let text = build_context(&[chunk("notes.txt", None, "body")]);
        assert!(text.starts_with("[Source: notes.txt]\nbody"));
    }

    #[test]
    fn test_context_preserves_received_order() {
        let text = build_context(&[
            chunk("a.txt", None, "first chunk"),
            chunk("b.txt", None, "second chunk"),
        ]);

        let first = text.find("first chunk").unwrap();
        let second = text.find("second chunk").unwrap();
        assert!(first < second);
        assert!(text.contains("\n\n---\n\n"));
    }

    #[test]
    fn test_empty_history_placeholder() {
        assert_eq!(build_chat_history(&[]), "No previous conversation.");
    }

    #[test]
    fn test_history_window_keeps_most_recent() {
        let messages: Vec<ChatMessage> = (0..15)
            .map(|i| ChatMessage::user(format!("message {i}")))
            .collect();

        let history = build_chat_history(&messages);

        assert!(!history.contains("message 4"));
        assert!(history.contains("message 5"));
        assert!(history.contains("message 14"));
    }

    #[test]
    fn test_history_messages_are_truncated() {
        let long = "x".repeat(800);
        let history = build_chat_history(&[ChatMessage::assistant(long)]);

        // "Assistant: " prefix plus the capped content.
        assert_eq!(history.len(), "Assistant: ".len() + 500);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_qa_prompt_sections() {
        let prompt = build_qa_prompt(
            "What is the total?",
            &[chunk("sheet.pdf", Some(1), "the total is 42")],
            &[ChatMessage::user("earlier question")],
        );

        assert!(prompt.contains("## Context"));
        assert!(prompt.contains("the total is 42"));
        assert!(prompt.contains("## Conversation History"));
        assert!(prompt.contains("User: earlier question"));
        assert!(prompt.contains("## Question\nWhat is the total?"));
        assert!(prompt.contains("## Instructions"));
    }
}
