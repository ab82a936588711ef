//! Fan chunks out to extractors under a concurrency ceiling and merge the
//! results.
//!
//! The ceiling is a semaphore shared by the per-chunk tasks: each task
//! holds a permit for the duration of its model call and drops it on every
//! exit path, including a panic. All tasks are awaited; a failed chunk
//! never cancels its siblings. Merged order follows completion, not the
//! document, so callers needing document order sort by date.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use veil_core::{ModelConfig, TransactionCandidate};
use veil_ingest::{DEFAULT_MAX_CHARS, TextChunk, chunk_text};

use crate::client::OpenAiCompatibleClient;
use crate::error::ExtractError;
use crate::worker::ExtractionWorker;

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Per-chunk extraction. Implementations must not fail: a bad chunk
/// yields an empty list.
#[async_trait]
pub trait ChunkExtractor: Send + Sync {
    async fn extract_chunk(&self, chunk: &TextChunk) -> Vec<TransactionCandidate>;
}

/// Outcome of one `analyze_report` call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    pub chunk_count: usize,
    /// Chunks whose task panicked or was cancelled
    pub aborted_chunks: usize,
    pub transactions: Vec<TransactionCandidate>,
}

impl Analysis {
    /// Chunks were sent but nothing came back. Either the statement had no
    /// transactions or every call failed; this layer cannot tell which.
    pub fn came_back_empty(&self) -> bool {
        self.chunk_count > 0 && self.transactions.is_empty()
    }
}

pub struct ExtractionOrchestrator {
    extractor: Arc<dyn ChunkExtractor>,
    max_chunk_chars: usize,
    max_concurrency: usize,
}

impl ExtractionOrchestrator {
    pub fn new(extractor: Arc<dyn ChunkExtractor>) -> Self {
        Self {
            extractor,
            max_chunk_chars: DEFAULT_MAX_CHARS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Wire the HTTP client and worker for `config`. Fails only on an
    /// invalid config, before any request is made.
    pub fn from_config(config: &ModelConfig, reference_year: i32) -> Result<Self, ExtractError> {
        let client = Arc::new(OpenAiCompatibleClient::new(config)?);
        let worker = ExtractionWorker::new(client, config, reference_year);
        Ok(Self::new(Arc::new(worker)))
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub async fn analyze(&self, text: &str) -> Vec<TransactionCandidate> {
        self.analyze_report(text).await.transactions
    }

    pub async fn analyze_report(&self, text: &str) -> Analysis {
        let chunks = chunk_text(text, self.max_chunk_chars);
        let chunk_count = chunks.len();
        if chunks.is_empty() {
            return Analysis::default();
        }

        info!(
            chunks = chunk_count,
            max_concurrency = self.max_concurrency,
            "dispatching extraction"
        );

        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for chunk in chunks {
            let gate = Arc::clone(&gate);
            let extractor = Arc::clone(&self.extractor);
            tasks.spawn(async move {
                let Ok(_permit) = gate.acquire_owned().await else {
                    return Vec::new();
                };
                extractor.extract_chunk(&chunk).await
            });
        }

        let mut transactions = Vec::new();
        let mut aborted_chunks = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(found) => {
                    debug!(found = found.len(), "chunk merged");
                    transactions.extend(found);
                }
                Err(e) => {
                    warn!(error = %e, "chunk task aborted; continuing without it");
                    aborted_chunks += 1;
                }
            }
        }

        info!(
            chunks = chunk_count,
            aborted = aborted_chunks,
            transactions = transactions.len(),
            "extraction finished"
        );

        Analysis {
            chunk_count,
            aborted_chunks,
            transactions,
        }
    }
}
