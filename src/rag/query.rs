//! Query pipeline: answering questions from page chunks or the index.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::ExtractionResult;

use super::service::{with_timeout, AnswerModel, Embedder, ServiceError, VectorIndex, VectorMatch};

/// Entries kept in a [`QueryHistory`].
pub const HISTORY_LIMIT: usize = 50;

const NO_CONTENT_ANSWER: &str = "Sorry, no relevant information was found on this page.";
const NO_MATCHES_ANSWER: &str = "No relevant information found in your browsed pages. \
     Try extracting content from a page first.";
const CURRENT_PAGE: &str = "Current Page";

/// Where an answer's context came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Page URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Similarity score, 1.0 for direct page context.
    pub score: f32,
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// The question.
    pub query: String,
    /// The answer, or an error explanation.
    pub answer: String,
    /// Sources used.
    pub sources: Vec<SourceRef>,
    /// When the answer was produced.
    pub timestamp: DateTime<Utc>,
}

/// Answered questions, newest first, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryHistory {
    entries: VecDeque<QueryRecord>,
}

impl QueryHistory {
    /// Record an entry, dropping the oldest beyond the cap.
    pub fn record(&mut self, entry: QueryRecord) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueryRecord> {
        self.entries.iter()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&QueryRecord> {
        self.entries.front()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
struct SlotState {
    issued: u64,
    context: Option<Arc<ExtractionResult>>,
}

/// Permission to commit a page context, taken before extraction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct ContextTicket {
    generation: u64,
}

/// The "current page" context used for direct answering.
///
/// Extraction runs asynchronously, so an older extraction can finish after a
/// newer one. Each extraction takes a [`ContextTicket`] first; a commit only
/// succeeds while its ticket is the newest issued, so a stale result never
/// replaces a fresher one.
#[derive(Debug, Clone, Default)]
pub struct PageContextSlot {
    state: Arc<Mutex<SlotState>>,
}

impl PageContextSlot {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a ticket, invalidating all earlier ones.
    pub fn ticket(&self) -> ContextTicket {
        let mut state = self.lock();
        state.issued += 1;
        ContextTicket {
            generation: state.issued,
        }
    }

    /// Store `context` if `ticket` is still the newest. Returns whether it
    /// was stored.
    pub fn commit(&self, ticket: ContextTicket, context: ExtractionResult) -> bool {
        let mut state = self.lock();
        if ticket.generation != state.issued {
            tracing::debug!(ticket = ticket.generation, newest = state.issued, "discarding stale page context");
            return false;
        }
        state.context = Some(Arc::new(context));
        true
    }

    /// The stored context.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ExtractionResult>> {
        self.lock().context.clone()
    }

    /// Drop the stored context and invalidate outstanding tickets.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.issued += 1;
        state.context = None;
    }
}

/// Query limits.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    /// Matches requested from the index.
    pub top_k: usize,
    /// Chunks included in a direct-context prompt.
    pub max_context_chunks: usize,
    /// Deadline for any single backend call.
    pub call_timeout: Duration,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chunks: 8,
            call_timeout: Duration::from_secs(30),
        }
    }
}

fn direct_prompt(title: &str, context: &str, query: &str) -> String {
    format!(
        "Based on the following content from the webpage \"{title}\", answer the user's question accurately and helpfully.\n\n\
         WEBPAGE CONTENT:\n{context}\n\n\
         USER QUESTION: {query}\n\n\
         Answer from the provided content. If it does not fully answer the question, answer as well as the \
         available information allows, or say politely that the question should be about the webpage content."
    )
}

fn retrieval_prompt(context: &str, query: &str) -> String {
    format!(
        "Answer the following question using ONLY the context provided from previously browsed web pages. \
         If the context doesn't contain enough information to answer the question, say so clearly.\n\n\
         CONTEXT FROM BROWSED PAGES:\n{context}\n\n\
         USER QUESTION: {query}\n\n\
         Provide a helpful answer based on the provided context, and mention which sources you're drawing from."
    )
}

/// Answers questions against page content.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    model: Arc<dyn AnswerModel>,
    settings: QuerySettings,
}

impl QueryPipeline {
    /// Pipeline over the given backends.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn AnswerModel>,
        settings: QuerySettings,
    ) -> Self {
        Self {
            embedder,
            index,
            model,
            settings,
        }
    }

    /// Answer `query` and record it in `history`.
    ///
    /// Context precedence: `direct` content, then the page stored in
    /// `context`, then a vector search. Backend failures become answer text.
    pub async fn answer(
        &self,
        query: &str,
        direct: Option<&ExtractionResult>,
        context: &PageContextSlot,
        history: &mut QueryHistory,
    ) -> QueryRecord {
        let (answer, sources) = if let Some(page) = direct {
            tracing::debug!("answering from direct content");
            self.answer_from_page(query, page).await
        } else if let Some(page) = context.current() {
            tracing::debug!("answering from stored page context");
            self.answer_from_page(query, &page).await
        } else {
            tracing::debug!("answering from vector search");
            self.answer_from_index(query).await
        };

        let record = QueryRecord {
            query: query.to_string(),
            answer,
            sources,
            timestamp: Utc::now(),
        };
        history.record(record.clone());
        record
    }

    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let answer = with_timeout("generate", self.settings.call_timeout, self.model.generate(prompt)).await?;
        if answer.trim().is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(answer)
    }

    async fn answer_from_page(&self, query: &str, page: &ExtractionResult) -> (String, Vec<SourceRef>) {
        let context = page
            .chunks
            .iter()
            .take(self.settings.max_context_chunks)
            .enumerate()
            .map(|(i, chunk)| format!("[Chunk {}] {}", i + 1, chunk.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        if context.is_empty() {
            return (NO_CONTENT_ANSWER.to_string(), Vec::new());
        }

        let metadata = page.metadata.as_ref();
        let or_current = |value: Option<&String>| {
            value
                .filter(|v| !v.is_empty())
                .map_or_else(|| CURRENT_PAGE.to_string(), Clone::clone)
        };
        let title = or_current(metadata.map(|m| &m.title));
        let url = or_current(metadata.map(|m| &m.url));

        match self.generate(&direct_prompt(&title, &context, query)).await {
            Ok(answer) => (answer, vec![SourceRef { url, title, score: 1.0 }]),
            Err(e) => (format!("Error processing the page content: {e}"), Vec::new()),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<VectorMatch>, ServiceError> {
        let limit = self.settings.call_timeout;
        let vector = with_timeout("embed", limit, self.embedder.embed(query)).await?;
        with_timeout("query", limit, self.index.query(&vector, self.settings.top_k)).await
    }

    async fn answer_from_index(&self, query: &str) -> (String, Vec<SourceRef>) {
        let matches = match self.search(query).await {
            Ok(matches) => matches,
            Err(e) => return (format!("Error searching your browsed pages: {e}"), Vec::new()),
        };
        if matches.is_empty() {
            return (NO_MATCHES_ANSWER.to_string(), Vec::new());
        }

        let context = matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                format!(
                    "[Source {}] From \"{}\" ({}):\n{}",
                    i + 1,
                    m.metadata.title,
                    m.metadata.domain,
                    m.metadata.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        match self.generate(&retrieval_prompt(&context, query)).await {
            Ok(answer) => {
                let sources = matches
                    .iter()
                    .map(|m| SourceRef {
                        url: m.metadata.url.clone(),
                        title: m.metadata.title.clone(),
                        score: m.score,
                    })
                    .collect();
                (answer, sources)
            }
            Err(e) => (format!("Error searching your browsed pages: {e}"), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::rag::service::{VectorMetadata, VectorRecord};
    use crate::result::{Chunk, ChunkKind, PageMetadata};

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _: &str) -> Result<Vec<f32>, ServiceError> {
            Ok(vec![0.5; 4])
        }
    }

    struct FakeIndex {
        matches: Vec<VectorMatch>,
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn upsert(&self, _: &[VectorRecord]) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn query(&self, _: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ServiceError> {
            Ok(self.matches.iter().take(top_k).cloned().collect())
        }
        async fn delete_all(&self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeModel {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl AnswerModel for FakeModel {
        async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(ServiceError::Http {
                    status: 429,
                    body: String::new(),
                });
            }
            Ok("generated answer".to_string())
        }
    }

    fn hit(title: &str, score: f32) -> VectorMatch {
        VectorMatch {
            id: format!("{title}_0"),
            score,
            metadata: VectorMetadata {
                text: format!("Stored text from {title}."),
                url: format!("https://example.com/{title}"),
                title: title.to_string(),
                domain: "example.com".to_string(),
                kind: "p".to_string(),
            },
        }
    }

    fn page(chunks: usize) -> ExtractionResult {
        let mut result = ExtractionResult::failure("placeholder");
        result.success = true;
        result.chunks = (0..chunks)
            .map(|i| Chunk::new(ChunkKind::Paragraph, format!("chunk body {i}"), String::new(), i, "p".into()))
            .collect();
        result.metadata = Some(PageMetadata {
            title: "Docs page".to_string(),
            url: "https://example.com/docs".to_string(),
            ..PageMetadata::default()
        });
        result
    }

    fn pipeline(matches: Vec<VectorMatch>, model: Arc<FakeModel>) -> QueryPipeline {
        QueryPipeline::new(
            Arc::new(FakeEmbedder),
            Arc::new(FakeIndex { matches }),
            model,
            QuerySettings::default(),
        )
    }

    #[tokio::test]
    async fn test_direct_content_takes_precedence() {
        let model = Arc::new(FakeModel::default());
        let slot = PageContextSlot::new();
        let mut history = QueryHistory::default();

        let record = pipeline(vec![hit("a", 0.9)], model.clone())
            .answer("what?", Some(&page(10)), &slot, &mut history)
            .await;

        assert_eq!(record.answer, "generated answer");
        assert_eq!(
            record.sources,
            vec![SourceRef {
                url: "https://example.com/docs".to_string(),
                title: "Docs page".to_string(),
                score: 1.0
            }]
        );
        let prompt = model.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("[Chunk 1] chunk body 0"));
        assert!(prompt.contains("[Chunk 8] chunk body 7"));
        assert!(!prompt.contains("[Chunk 9]"));
        assert!(prompt.contains("\"Docs page\""));
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_stored_context_before_search() {
        let model = Arc::new(FakeModel::default());
        let slot = PageContextSlot::new();
        let ticket = slot.ticket();
        assert!(slot.commit(ticket, page(2)));
        let mut history = QueryHistory::default();

        let record = pipeline(vec![hit("a", 0.9)], model.clone())
            .answer("what?", None, &slot, &mut history)
            .await;
        assert_eq!(record.sources[0].title, "Docs page");
    }

    #[tokio::test]
    async fn test_vector_search() {
        let model = Arc::new(FakeModel::default());
        let mut history = QueryHistory::default();
        let record = pipeline(vec![hit("a", 0.9), hit("b", 0.7)], model.clone())
            .answer("what?", None, &PageContextSlot::new(), &mut history)
            .await;

        assert_eq!(record.sources.len(), 2);
        assert!((record.sources[1].score - 0.7).abs() < f32::EPSILON);
        let prompt = model.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("[Source 1] From \"a\" (example.com):\nStored text from a."));
    }

    #[tokio::test]
    async fn test_fixed_answers() {
        let model = Arc::new(FakeModel::default());
        let mut history = QueryHistory::default();
        let slot = PageContextSlot::new();

        let record = pipeline(Vec::new(), model.clone())
            .answer("q", None, &slot, &mut history)
            .await;
        assert_eq!(record.answer, NO_MATCHES_ANSWER);

        let record = pipeline(Vec::new(), model.clone())
            .answer("q", Some(&page(0)), &slot, &mut history)
            .await;
        assert_eq!(record.answer, NO_CONTENT_ANSWER);
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_errors_become_answers() {
        let model = Arc::new(FakeModel {
            fail: true,
            ..FakeModel::default()
        });
        let mut history = QueryHistory::default();
        let record = pipeline(vec![hit("a", 0.9)], model)
            .answer("q", None, &PageContextSlot::new(), &mut history)
            .await;
        assert!(record.answer.starts_with("Error searching your browsed pages: Rate limit"));
        assert!(record.sources.is_empty());
        assert_eq!(history.latest(), Some(&record));
    }

    #[test]
    fn test_history_is_capped_newest_first() {
        let mut history = QueryHistory::default();
        for i in 0..60 {
            history.record(QueryRecord {
                query: format!("q{i}"),
                answer: String::new(),
                sources: Vec::new(),
                timestamp: Utc::now(),
            });
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.latest().map(|r| r.query.as_str()), Some("q59"));
        assert_eq!(history.iter().last().map(|r| r.query.as_str()), Some("q10"));
    }

    #[test]
    fn test_stale_ticket_cannot_overwrite() {
        let slot = PageContextSlot::new();
        let older = slot.ticket();
        let newer = slot.ticket();
        assert!(slot.commit(newer, page(3)));
        assert!(!slot.commit(older, page(1)));
        assert_eq!(slot.current().map(|p| p.chunks.len()), Some(3));

        let pending = slot.ticket();
        slot.clear();
        assert!(!slot.commit(pending, page(1)));
        assert!(slot.current().is_none());
    }
}
