//! Errors raised before any I/O is attempted.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("model endpoint must be an http(s) URL, got {0:?}")]
    InvalidEndpoint(String),

    #[error("model credential is empty")]
    MissingCredential,

    #[error("model identifier is empty")]
    MissingModel,

    #[error("temperature {0} is outside 0.0..=2.0")]
    InvalidTemperature(String),

    #[error("unknown locale {0:?} (expected \"zh\" or \"en\")")]
    UnknownLocale(String),
}
