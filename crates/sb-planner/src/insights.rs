// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retrieval of "lessons learned" from past workflows, stored in a
//! knowledge graph and indexed by embedding similarity. Retrieval is
//! advisory: callers treat a failure here as "no lessons available"
//! rather than aborting the plan.

use crate::error::PlannerError;
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait InsightStore: Send + Sync {
    /// The `k` closest `Insight` lessons to `query` by embedding distance.
    async fn top_insights(&self, query: &str, k: usize) -> Result<Vec<String>, PlannerError>;
}

pub struct HttpInsightStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInsightStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[derive(Deserialize)]
struct InsightSearchResponse {
    #[serde(default)]
    lessons: Vec<String>,
}

#[async_trait]
impl InsightStore for HttpInsightStore {
    async fn top_insights(&self, query: &str, k: usize) -> Result<Vec<String>, PlannerError> {
        let response = self
            .client
            .post(format!("{}/v1/insights/search", self.base_url))
            .json(&serde_json::json!({ "query": query, "k": k }))
            .send()
            .await?
            .error_for_status()?;
        let parsed: InsightSearchResponse = response.json().await?;
        Ok(parsed.lessons)
    }
}

/// Always returns no lessons. Used where no knowledge graph is configured.
pub struct NoInsights;

#[async_trait]
impl InsightStore for NoInsights {
    async fn top_insights(&self, _query: &str, _k: usize) -> Result<Vec<String>, PlannerError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl InsightStore for Box<dyn InsightStore> {
    async fn top_insights(&self, query: &str, k: usize) -> Result<Vec<String>, PlannerError> {
        (**self).top_insights(query, k).await
    }
}
