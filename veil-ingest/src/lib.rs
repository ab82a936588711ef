//! veil-ingest: text preparation ahead of any model call (PII redaction,
//! line-bounded chunking).

pub mod chunker;
pub mod error;
pub mod redact;
pub mod types;

pub use chunker::{DEFAULT_MAX_CHARS, chunk_text};
pub use error::RedactError;
pub use redact::{PatternRedactor, Redaction, RedactionRule, RedactionStage, default_rules};
pub use types::{PiiClass, RedactionEvent, TextChunk};
