use thiserror::Error;

use crate::redact::RedactionStage;

#[derive(Error, Debug)]
pub enum RedactError {
    #[error("invalid pattern for stage {stage:?}: {source}")]
    InvalidPattern {
        stage: RedactionStage,
        #[source]
        source: regex::Error,
    },
}
