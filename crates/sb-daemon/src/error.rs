// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type for the HTTP surface. Maps every internal failure
//! mode onto a status code, following the policy table: transient bus or
//! store failures are retryable (503), a schema-invalid plan never creates
//! a workflow (400), everything else that reaches here is a bug (500).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sb_engine::EngineError;
use sb_planner::PlannerError;
use sb_storage::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("workflow not found")]
    WorkflowNotFound,
    #[error("goal not found")]
    GoalNotFound,
    #[error("task not found")]
    TaskNotFound,
    #[error("the planner's reply did not match the expected schema")]
    PlannerSchema,
    #[error("bus is temporarily unavailable, retry")]
    TransientBus,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        EngineError::Store(err).into()
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::Schema(_) => ApiError::PlannerSchema,
            PlannerError::Engine(inner) => inner.into(),
            PlannerError::Gateway(_) | PlannerError::Invalid(_) => ApiError::PlannerSchema,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::WorkflowNotFound | ApiError::GoalNotFound | ApiError::TaskNotFound => StatusCode::NOT_FOUND,
            ApiError::PlannerSchema => StatusCode::BAD_REQUEST,
            ApiError::TransientBus => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Engine(EngineError::DispatchFailed(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Engine(EngineError::Store(StoreError::WorkflowNotFound(_) | StoreError::GoalNotFound(_) | StoreError::BlockNotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Engine(EngineError::Store(StoreError::Wal(_) | StoreError::Migration(_))) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Engine(EngineError::Store(
                StoreError::WorkflowAlreadyExists(_) | StoreError::IllegalTransition { .. } | StoreError::NotPendingClarification(_),
            )) => StatusCode::CONFLICT,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Process exit codes for the `serve` and `bootstrap-goals` subcommands:
/// `0` graceful shutdown, `1` fatal init failure (store/bus unreachable),
/// `2` configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Fatal = 1,
    Config = 2,
}
