//! veil-core: shared types for the statement redaction and extraction pipeline

pub mod category;
pub mod error;
pub mod model;
pub mod transaction;

pub use category::{Category, Locale};
pub use error::ConfigError;
pub use model::ModelConfig;
pub use transaction::{TransactionCandidate, TransactionRecord};
