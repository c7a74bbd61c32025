// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-derived configuration. Every `SWITCHBOARD_*` variable has a
//! typed default so a bare `serve` works against the in-memory bus and a
//! throwaway store directory without any environment set at all.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {source}")]
    InvalidValue { var: &'static str, source: Box<dyn std::error::Error + Send + Sync> },
}

fn env_or<T, E>(var: &'static str, default: T, parse: impl Fn(&str) -> Result<T, E>) -> Result<T, ConfigError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(var) {
        Ok(raw) => parse(&raw).map_err(|err| ConfigError::InvalidValue { var, source: Box::new(err) }),
        Err(_) => Ok(default),
    }
}

fn env_string(var: &'static str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_opt_string(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `pulsar://...` service URL, or the literal `memory` to run against
    /// the in-process bus (the default, so a bare `serve` always works).
    pub bus_service_url: String,
    pub store_dir: PathBuf,
    pub default_model: String,
    pub http_bind_addr: SocketAddr,
    pub goal_monitor_interval: Duration,
    pub checkpoint_interval: Duration,
    pub llm_gateway_url: Option<String>,
    pub insights_url: Option<String>,
    pub metrics_url: Option<String>,
    pub forecast_url: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            bus_service_url: env_string("SWITCHBOARD_BUS_URL", "memory"),
            store_dir: PathBuf::from(env_string("SWITCHBOARD_STORE_DIR", "./switchboard-data")),
            default_model: env_string("SWITCHBOARD_DEFAULT_MODEL", "gpt-4-turbo"),
            http_bind_addr: env_or(
                "SWITCHBOARD_HTTP_ADDR",
                SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080)),
                |s| s.parse::<SocketAddr>(),
            )?,
            goal_monitor_interval: env_or("SWITCHBOARD_GOAL_POLL_SECS", Duration::from_secs(60), |s| {
                s.parse::<u64>().map(Duration::from_secs)
            })?,
            checkpoint_interval: env_or("SWITCHBOARD_CHECKPOINT_SECS", Duration::from_secs(300), |s| {
                s.parse::<u64>().map(Duration::from_secs)
            })?,
            llm_gateway_url: env_opt_string("SWITCHBOARD_LLM_URL"),
            insights_url: env_opt_string("SWITCHBOARD_INSIGHTS_URL"),
            metrics_url: env_opt_string("SWITCHBOARD_METRICS_URL"),
            forecast_url: env_opt_string("SWITCHBOARD_FORECAST_URL"),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
