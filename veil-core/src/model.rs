//! Connection settings for the upstream model endpoint.

use std::fmt;
use std::time::Duration;

use crate::category::Locale;
use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "qwen/qwen3-next-80b-a3b-instruct";
/// Extraction is structured output, not prose: keep sampling near-deterministic.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, PartialEq)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API (no trailing `/chat/completions`).
    pub endpoint: String,
    pub credential: String,
    pub model: String,
    pub locale: Locale,
    pub temperature: f32,
    /// Per-request transport timeout.
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(
        endpoint: impl Into<String>,
        credential: impl Into<String>,
        model: impl Into<String>,
        locale: Locale,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
            model: model.into(),
            locale,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject configurations that could never produce a successful request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if self.credential.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature.to_string()));
        }
        Ok(())
    }
}

// Hand-written so the credential never reaches a log line.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("credential", &"<hidden>")
            .field("model", &self.model)
            .field("locale", &self.locale)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}
