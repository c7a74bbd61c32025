// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The LLM gateway the planner calls to analyze and decompose a goal.
//! Modeled as a trait so tests exercise the planner against a canned
//! fake rather than a live chat-completion endpoint.

use crate::error::PlannerError;
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, PlannerError>;
}

/// Calls an OpenAI-compatible chat-completions endpoint.
pub struct HttpLlmGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLlmGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageReply,
}

#[derive(Deserialize)]
struct ChatMessageReply {
    content: String,
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, PlannerError> {
        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": 2048,
        });
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(content)
    }
}

#[async_trait]
impl LlmGateway for Box<dyn LlmGateway> {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, PlannerError> {
        (**self).complete(model, prompt).await
    }
}
