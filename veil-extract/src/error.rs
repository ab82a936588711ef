use thiserror::Error;
use veil_core::ConfigError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid model config: {0}")]
    Config(#[from] ConfigError),

    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no content")]
    EmptyResponse,

    #[error("malformed model output: {reason} (snippet: {snippet:?})")]
    Malformed { reason: String, snippet: String },
}

impl ExtractError {
    pub(crate) fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        ExtractError::Malformed {
            reason: reason.into(),
            snippet: snippet(raw),
        }
    }
}

const SNIPPET_CHARS: usize = 200;

/// First characters of a model response, for diagnostics.
pub(crate) fn snippet(raw: &str) -> String {
    raw.chars().take(SNIPPET_CHARS).collect()
}
