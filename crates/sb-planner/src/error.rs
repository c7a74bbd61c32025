// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("llm gateway call failed: {0}")]
    Gateway(#[from] reqwest::Error),
    #[error("llm reply did not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] sb_core::CoreError),
    #[error(transparent)]
    Engine(#[from] sb_engine::EngineError),
}
