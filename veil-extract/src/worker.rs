//! One chunk in, transaction candidates out.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use veil_core::{ModelConfig, TransactionCandidate};
use veil_ingest::TextChunk;

use crate::client::{CompletionRequest, ModelClient};
use crate::error::ExtractError;
use crate::orchestrator::ChunkExtractor;
use crate::parse::parse_candidates;
use crate::prompt::{system_prompt, user_message};

pub struct ExtractionWorker {
    client: Arc<dyn ModelClient>,
    temperature: f32,
    reference_year: i32,
    system: String,
}

impl ExtractionWorker {
    /// `reference_year` fills in dates the statement prints without a year.
    pub fn new(client: Arc<dyn ModelClient>, config: &ModelConfig, reference_year: i32) -> Self {
        Self {
            client,
            temperature: config.temperature,
            reference_year,
            system: system_prompt(config.locale, reference_year),
        }
    }

    pub fn request_for(&self, chunk: &str) -> CompletionRequest {
        CompletionRequest {
            system: self.system.clone(),
            user: user_message(chunk),
            temperature: self.temperature,
        }
    }

    /// Extract with errors surfaced to the caller.
    pub async fn try_extract(&self, chunk: &str) -> Result<Vec<TransactionCandidate>, ExtractError> {
        let completion = self.client.complete(&self.request_for(chunk)).await?;
        parse_candidates(&completion.content, self.reference_year)
    }

    /// Extract, turning any failure into an empty result.
    pub async fn extract(&self, chunk: &str) -> Vec<TransactionCandidate> {
        match self.try_extract(chunk).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "chunk extraction failed; continuing without it");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ChunkExtractor for ExtractionWorker {
    async fn extract_chunk(&self, chunk: &TextChunk) -> Vec<TransactionCandidate> {
        let found = self.extract(&chunk.content).await;
        debug!(chunk = chunk.index, found = found.len(), "chunk extracted");
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Completion;
    use std::sync::Mutex;
    use veil_core::{Category, Locale};

    struct Scripted {
        reply: Result<String, u16>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl Scripted {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn status(code: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(code),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelClient for Scripted {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExtractError> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(body) => Ok(Completion {
                    content: body.clone(),
                }),
                Err(code) => Err(ExtractError::Status {
                    status: *code,
                    body: "rate limited".to_string(),
                }),
            }
        }
    }

    fn config(locale: Locale) -> ModelConfig {
        ModelConfig::new("https://example.test/v1", "sk-test", "test-model", locale)
    }

    #[tokio::test]
    async fn test_request_carries_instructions_and_chunk() {
        let client = Scripted::ok("[]");
        let worker = ExtractionWorker::new(client.clone(), &config(Locale::Zh), 2026);
        worker.extract("10/01 滴滴出行 25.50").await;

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].system.contains("需要复核"));
        assert!(seen[0].system.contains("2026"));
        assert!(seen[0].user.contains("10/01 滴滴出行 25.50"));
        assert!(seen[0].temperature <= 0.2);
    }

    #[tokio::test]
    async fn test_extract_parses_reply() {
        let client = Scripted::ok(
            "```json\n[{\"Date\": \"10-01\", \"Description\": \"DIDI\", \"Amount\": 25.5, \"Category\": \"交通\", \"CardLastFour\": \"8888\"}]\n```",
        );
        let worker = ExtractionWorker::new(client, &config(Locale::Zh), 2026);
        let found = worker.extract("irrelevant").await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, Category::Transportation);
        assert_eq!(found[0].date.to_string(), "2026-10-01");
    }

    #[tokio::test]
    async fn test_transport_error_is_swallowed() {
        let worker = ExtractionWorker::new(Scripted::status(429), &config(Locale::En), 2026);
        assert!(worker.extract("chunk").await.is_empty());
        assert!(matches!(
            worker.try_extract("chunk").await,
            Err(ExtractError::Status { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_swallowed() {
        let worker = ExtractionWorker::new(
            Scripted::ok("Sorry, I cannot help with that."),
            &config(Locale::En),
            2026,
        );
        let chunk = TextChunk {
            index: 3,
            content: "chunk".to_string(),
        };
        assert!(worker.extract_chunk(&chunk).await.is_empty());
    }
}
