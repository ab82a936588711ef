//! veil-extract: chunk-level transaction extraction over an OpenAI-compatible
//! model, fanned out under a concurrency ceiling

pub mod client;
pub mod error;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod worker;

pub use client::{Completion, CompletionRequest, ModelClient, OpenAiCompatibleClient};
pub use error::ExtractError;
pub use orchestrator::{Analysis, ChunkExtractor, DEFAULT_MAX_CONCURRENCY, ExtractionOrchestrator};
pub use parse::parse_candidates;
pub use worker::ExtractionWorker;

use chrono::Datelike;
use veil_core::{ModelConfig, TransactionCandidate};

/// Extract every transaction in already-redacted `text` with default chunking
/// and concurrency. Year-less dates resolve to the current local year.
///
/// Errors only on an invalid config; per-chunk failures are logged and
/// contribute nothing.
pub async fn analyze(
    text: &str,
    config: &ModelConfig,
) -> Result<Vec<TransactionCandidate>, ExtractError> {
    let year = chrono::Local::now().year();
    let orchestrator = ExtractionOrchestrator::from_config(config, year)?;
    Ok(orchestrator.analyze(text).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::Locale;

    #[tokio::test]
    async fn test_invalid_config_fails_before_any_call() {
        let cfg = ModelConfig::new("ftp://nowhere", "sk-test", "m", Locale::Zh);
        assert!(matches!(
            analyze("10/01 UBER 25.50", &cfg).await,
            Err(ExtractError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_requests() {
        // Unroutable endpoint: any request would fail, but none is made.
        let cfg = ModelConfig::new("http://127.0.0.1:9/v1", "sk-test", "m", Locale::En);
        assert!(analyze("", &cfg).await.unwrap().is_empty());
    }
}
