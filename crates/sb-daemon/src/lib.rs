// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switchboard daemon: the HTTP surface, background loops, and composition
//! root that turn `sb-engine`, `sb-planner`, and `sb-storage` into a running
//! agent workflow orchestration service.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod secrets;
pub mod telemetry;

pub use config::{ConfigError, Settings};
pub use dashboard::DashboardBroadcaster;
pub use error::{ApiError, ExitCode};
pub use http::{build_router, AppState};
pub use orchestrator::{Orchestrator, OrchestratorError};
pub use secrets::{EnvSecretsProvider, SecretsError, SecretsProvider};
