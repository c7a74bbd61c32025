// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read access to the AIOps stats and forecast stores the goal monitor
//! polls. Both are modeled as traits: the reference deployment backs them
//! with a metrics time-series service, but the monitor itself only needs
//! point lookups.

use crate::error::PlannerError;
use async_trait::async_trait;
use serde::Deserialize;

#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// The current value of `service`'s `metric`, or `None` if unknown.
    async fn current(&self, service: &str, metric: &str) -> Result<Option<f64>, PlannerError>;
}

#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Forecasted `(timestamp, value)` points for `service`'s `metric`.
    async fn forecast(&self, service: &str, metric: &str) -> Result<Vec<(u64, f64)>, PlannerError>;
}

pub struct HttpMetricsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMetricsSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[derive(Deserialize)]
struct CurrentMetricResponse {
    value: Option<f64>,
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn current(&self, service: &str, metric: &str) -> Result<Option<f64>, PlannerError> {
        let response = self
            .client
            .get(format!("{}/v1/stats/{service}/{metric}", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let parsed: CurrentMetricResponse = response.json().await?;
        Ok(parsed.value)
    }
}

pub struct HttpForecastSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpForecastSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    points: Vec<ForecastPoint>,
}

#[derive(Deserialize)]
struct ForecastPoint {
    timestamp: u64,
    value: f64,
}

#[async_trait]
impl ForecastSource for HttpForecastSource {
    async fn forecast(&self, service: &str, metric: &str) -> Result<Vec<(u64, f64)>, PlannerError> {
        let response = self
            .client
            .get(format!("{}/v1/forecast/{service}/{metric}", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let parsed: ForecastResponse = response.json().await?;
        Ok(parsed.points.into_iter().map(|p| (p.timestamp, p.value)).collect())
    }
}

#[async_trait]
impl MetricsSource for Box<dyn MetricsSource> {
    async fn current(&self, service: &str, metric: &str) -> Result<Option<f64>, PlannerError> {
        (**self).current(service, metric).await
    }
}

#[async_trait]
impl ForecastSource for Box<dyn ForecastSource> {
    async fn forecast(&self, service: &str, metric: &str) -> Result<Vec<(u64, f64)>, PlannerError> {
        (**self).forecast(service, metric).await
    }
}
