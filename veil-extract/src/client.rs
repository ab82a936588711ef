//! Outbound model calls.
//!
//! Everything past this seam sees a single shape: a [`Completion`] or an
//! [`ExtractError`]. Tests swap in their own [`ModelClient`].

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use veil_core::ModelConfig;

use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExtractError>;
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol
/// (OpenAI, OpenRouter, local gateways).
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    url: String,
    credential: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    /// Build a client; the config's timeout applies to every request.
    pub fn new(config: &ModelConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            url: completions_url(&config.endpoint),
            credential: config.credential.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ExtractError> {
        let body = request_body(&self.model, request);

        let resp = self
            .http
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.credential))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(ExtractError::Status {
                status: status.as_u16(),
                body: crate::error::snippet(&txt),
            });
        }

        let out: Resp = resp.json().await?;
        completion_from(out)
    }
}

fn completions_url(endpoint: &str) -> String {
    format!("{}/chat/completions", endpoint.trim().trim_end_matches('/'))
}

fn request_body<'a>(model: &'a str, request: &'a CompletionRequest) -> Req<'a> {
    Req {
        model,
        messages: vec![
            Msg {
                role: "system",
                content: &request.system,
            },
            Msg {
                role: "user",
                content: &request.user,
            },
        ],
        temperature: request.temperature,
    }
}

fn completion_from(resp: Resp) -> Result<Completion, ExtractError> {
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ExtractError::EmptyResponse)?;
    Ok(Completion { content })
}
