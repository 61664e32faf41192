//! Storage pipeline: extraction result to vector index.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::result::ExtractionResult;

use super::service::{with_timeout, Embedder, ServiceError, VectorIndex, VectorMetadata, VectorRecord};

/// Storage thresholds and pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    /// Chunks shorter than this (chars) are not embedded.
    pub min_chunk_chars: usize,
    /// Pages with fewer total words are answered from direct context instead.
    pub direct_context_words: usize,
    /// Records per upsert call.
    pub batch_size: usize,
    /// Pause after each embedding call.
    pub embed_pause: Duration,
    /// Pause after each upsert batch.
    pub batch_pause: Duration,
    /// Deadline for any single backend call.
    pub call_timeout: Duration,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            min_chunk_chars: 50,
            direct_context_words: 500,
            batch_size: 10,
            embed_pause: Duration::from_millis(100),
            batch_pause: Duration::from_millis(200),
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// What happened to an uploaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The page was not suitable for retrieval use.
    Rejected {
        /// Why.
        reason: String,
    },
    /// The page is small enough to be used as direct context.
    DirectContext {
        /// Words on the page.
        total_words: usize,
    },
    /// Chunks were embedded and stored.
    Stored {
        /// Records upserted.
        stored: usize,
        /// Page URL.
        url: String,
    },
}

/// Embeds a page's chunks and stores them in the index.
pub struct StoragePipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    settings: StorageSettings,
}

impl StoragePipeline {
    /// Pipeline over the given backends.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, settings: StorageSettings) -> Self {
        Self {
            embedder,
            index,
            settings,
        }
    }

    /// Upload one extraction result.
    ///
    /// The index is cleared first; a failed clear is logged and ignored.
    /// Chunks whose embedding fails are skipped.
    ///
    /// # Errors
    ///
    /// Returns the first upsert failure.
    pub async fn upload(&self, result: &ExtractionResult) -> Result<UploadOutcome, ServiceError> {
        if !result.suitable {
            return Ok(UploadOutcome::Rejected {
                reason: "Not suitable for RAG".to_string(),
            });
        }
        if result.total_words < self.settings.direct_context_words {
            tracing::debug!(words = result.total_words, "page small enough for direct context");
            return Ok(UploadOutcome::DirectContext {
                total_words: result.total_words,
            });
        }

        let limit = self.settings.call_timeout;
        if let Err(e) = with_timeout("clear index", limit, self.index.delete_all()).await {
            tracing::warn!(error = %e, "failed to clear index, continuing");
        }

        let metadata = result.metadata.clone().unwrap_or_default();
        let millis = Utc::now().timestamp_millis();
        let mut records = Vec::new();

        for (i, chunk) in result.chunks.iter().enumerate() {
            if chunk.content.chars().count() < self.settings.min_chunk_chars {
                continue;
            }
            match with_timeout("embed", limit, self.embedder.embed(&chunk.content)).await {
                Ok(values) => {
                    records.push(VectorRecord {
                        id: format!("{}_{i}_{millis}", metadata.domain),
                        values,
                        metadata: VectorMetadata {
                            text: chunk.content.clone(),
                            url: metadata.url.clone(),
                            title: metadata.title.clone(),
                            domain: metadata.domain.clone(),
                            kind: chunk.kind.to_string(),
                        },
                    });
                    tokio::time::sleep(self.settings.embed_pause).await;
                }
                Err(e) => tracing::warn!(chunk = i, error = %e, "skipping chunk"),
            }
        }

        for batch in records.chunks(self.settings.batch_size.max(1)) {
            with_timeout("upsert", limit, self.index.upsert(batch)).await?;
            tracing::debug!(records = batch.len(), "batch uploaded");
            tokio::time::sleep(self.settings.batch_pause).await;
        }

        tracing::info!(stored = records.len(), url = %metadata.url, "page stored");
        Ok(UploadOutcome::Stored {
            stored: records.len(),
            url: metadata.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rag::service::VectorMatch;
    use crate::result::{Chunk, ChunkKind, PageMetadata};

    struct FakeEmbedder {
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
            if self.fail_on.as_deref().is_some_and(|f| text.contains(f)) {
                return Err(ServiceError::EmptyResponse);
            }
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        batches: Mutex<Vec<Vec<VectorRecord>>>,
        cleared: Mutex<usize>,
        fail_clear: bool,
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn upsert(&self, records: &[VectorRecord]) -> Result<(), ServiceError> {
            self.batches.lock().unwrap().push(records.to_vec());
            Ok(())
        }
        async fn query(&self, _: &[f32], _: usize) -> Result<Vec<VectorMatch>, ServiceError> {
            Ok(Vec::new())
        }
        async fn delete_all(&self) -> Result<(), ServiceError> {
            *self.cleared.lock().unwrap() += 1;
            if self.fail_clear {
                return Err(ServiceError::Http {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn settings() -> StorageSettings {
        StorageSettings {
            embed_pause: Duration::ZERO,
            batch_pause: Duration::ZERO,
            ..StorageSettings::default()
        }
    }

    fn page(chunks: usize, suitable: bool) -> ExtractionResult {
        let chunks: Vec<Chunk> = (0..chunks)
            .map(|i| {
                let text = format!("Chunk {i} carries enough words to be embedded. {}", "word ".repeat(40));
                Chunk::new(ChunkKind::Paragraph, text, String::new(), i, "p".to_string())
            })
            .collect();
        let mut result = ExtractionResult::failure("placeholder");
        result.success = true;
        result.error = None;
        result.suitable = suitable;
        result.total_words = chunks.iter().map(|c| c.word_count).sum();
        result.total_chunks = chunks.len();
        result.chunks = chunks;
        result.metadata = Some(PageMetadata {
            title: "Page".to_string(),
            url: "https://example.com/a".to_string(),
            domain: "example.com".to_string(),
            ..PageMetadata::default()
        });
        result
    }

    fn pipeline(embedder: FakeEmbedder, index: Arc<FakeIndex>) -> StoragePipeline {
        StoragePipeline::new(Arc::new(embedder), index, settings())
    }

    #[tokio::test]
    async fn test_rejects_unsuitable() {
        let index = Arc::new(FakeIndex::default());
        let outcome = pipeline(FakeEmbedder { fail_on: None }, index.clone())
            .upload(&page(20, false))
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Rejected { .. }));
        assert_eq!(*index.cleared.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_small_page_uses_direct_context() {
        let index = Arc::new(FakeIndex::default());
        let outcome = pipeline(FakeEmbedder { fail_on: None }, index.clone())
            .upload(&page(5, true))
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::DirectContext { total_words } if total_words < 500));
        assert!(index.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stores_in_batches_and_skips_failed_embeddings() {
        let index = Arc::new(FakeIndex {
            fail_clear: true,
            ..FakeIndex::default()
        });
        let embedder = FakeEmbedder {
            fail_on: Some("Chunk 3 ".to_string()),
        };
        let outcome = pipeline(embedder, index.clone()).upload(&page(22, true)).await.unwrap();

        assert_eq!(
            outcome,
            UploadOutcome::Stored {
                stored: 21,
                url: "https://example.com/a".to_string()
            }
        );
        let batches = index.batches.lock().unwrap();
        let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 1]);
        let first = &batches[0][0];
        assert!(first.id.starts_with("example.com_0_"));
        assert_eq!(first.metadata.kind, "p");
        assert_eq!(first.metadata.title, "Page");
        assert!(batches.iter().flatten().all(|r| !r.metadata.text.starts_with("Chunk 3 ")));
    }
}
