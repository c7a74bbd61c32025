// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: task submission, workflow inspection, approval gates,
//! goal clarification, and the goal CRUD endpoints. Identity is out of
//! scope; approval role checks read a single `x-switchboard-role` header
//! rather than validating a real token.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use sb_core::{Clock, GoalId, SystemClock, TaskBlock, TaskId, Value, Workflow, WorkflowId, WorkflowStatus};
use sb_engine::Executor;
use sb_planner::{InsightStore, LlmGateway, PlanOutcome, Planner};
use sb_storage::GoalStore;
use sb_wire::{ApproveTaskRequest, ClarifyRequest, CreateGoalRequest, SubmitTaskRequest, SubmitTaskResponse};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor<SystemClock>>,
    pub goals: GoalStore,
    pub planner: Arc<Planner<Box<dyn LlmGateway>, Box<dyn InsightStore>>>,
}

pub fn build_router(state: AppState, dashboard: crate::dashboard::DashboardBroadcaster) -> Router {
    let api = Router::new()
        .route("/v1/tasks", post(submit_task))
        .route("/v1/workflows/:workflow_id", get(get_workflow))
        .route("/v1/workflows/:workflow_id/context", get(get_context).patch(patch_context))
        .route("/v1/workflows/:workflow_id/tasks/:task_id/approve", post(approve_task))
        .route("/v1/goals/:workflow_id/clarify", post(clarify))
        .route("/v1/goals", post(create_goal).get(list_goals))
        .route("/v1/goals/:goal_id", get(get_goal))
        .with_state(state);

    let dashboard_routes = Router::new()
        .route("/v1/dashboard/ws", get(crate::dashboard::dashboard_ws_handler))
        .with_state(dashboard);

    Router::new()
        .merge(api)
        .merge(dashboard_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn submit_task(State(state): State<AppState>, Json(request): Json<SubmitTaskRequest>) -> Result<impl IntoResponse, ApiError> {
    match state.planner.plan(&request.prompt).await.map_err(ApiError::from)? {
        PlanOutcome::NeedsClarification { question } => {
            let workflow = Workflow {
                workflow_id: WorkflowId::new(),
                original_prompt: request.prompt,
                status: WorkflowStatus::PendingClarification,
                shared_context: Value::default(),
                tasks: Vec::new(),
                event_id: None,
                created_at: SystemClock.epoch_ms(),
            };
            state.executor.manager().create(workflow.clone())?;
            Ok((
                StatusCode::ACCEPTED,
                Json(SubmitTaskResponse {
                    workflow_id: workflow.workflow_id,
                    status: SubmitTaskResponse::PENDING_CLARIFICATION.to_string(),
                    num_tasks: 0,
                    clarifying_question: Some(question),
                }),
            ))
        }
        PlanOutcome::Workflow(generated) => {
            let num_tasks = generated.tasks.len();
            let workflow = generated.into_workflow(WorkflowId::new(), SystemClock.epoch_ms(), None);
            let workflow_id = workflow.workflow_id;
            state.executor.manager().create(workflow)?;
            state.executor.advance(workflow_id).await?;
            let status = if num_tasks == 1 {
                SubmitTaskResponse::ACCEPTED_SINGLE_TASK
            } else {
                SubmitTaskResponse::ACCEPTED_WORKFLOW
            };
            Ok((
                StatusCode::ACCEPTED,
                Json(SubmitTaskResponse {
                    workflow_id,
                    status: status.to_string(),
                    num_tasks,
                    clarifying_question: None,
                }),
            ))
        }
    }
}

async fn get_workflow(State(state): State<AppState>, Path(workflow_id): Path<WorkflowId>) -> Result<Json<Workflow>, ApiError> {
    let workflow = state.executor.manager().get(workflow_id).map_err(not_found_as_workflow)?;
    Ok(Json(workflow))
}

async fn get_context(State(state): State<AppState>, Path(workflow_id): Path<WorkflowId>) -> Result<Json<Value>, ApiError> {
    let workflow = state.executor.manager().get(workflow_id).map_err(not_found_as_workflow)?;
    Ok(Json(workflow.shared_context))
}

async fn patch_context(
    State(state): State<AppState>,
    Path(workflow_id): Path<WorkflowId>,
    Json(patch): Json<Value>,
) -> Result<StatusCode, ApiError> {
    state.executor.manager().merge_context(workflow_id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn approve_task(
    State(state): State<AppState>,
    Path((workflow_id, task_id)): Path<(WorkflowId, TaskId)>,
    headers: HeaderMap,
    Json(request): Json<ApproveTaskRequest>,
) -> Result<StatusCode, ApiError> {
    let workflow = state.executor.manager().get(workflow_id).map_err(not_found_as_workflow)?;
    let block = workflow.blocks().get(&task_id).copied().ok_or(ApiError::TaskNotFound)?;
    let TaskBlock::ApprovalBlock { required_role, .. } = block else {
        return Err(ApiError::TaskNotFound);
    };

    if let Some(required_role) = required_role {
        let caller_role = headers.get("x-switchboard-role").and_then(|v| v.to_str().ok());
        if caller_role != Some(required_role.as_str()) {
            return Ok(StatusCode::FORBIDDEN);
        }
    }

    let (status, result) = if request.approved {
        (sb_core::BlockStatus::Completed, None)
    } else {
        (sb_core::BlockStatus::Failed, Some(Value::String("rejected".to_string())))
    };
    state.executor.manager().update_task_status(workflow_id, task_id, status, result, None, "approve-endpoint").await?;
    state.executor.advance(workflow_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clarify(
    State(state): State<AppState>,
    Path(workflow_id): Path<WorkflowId>,
    Json(request): Json<ClarifyRequest>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state.executor.manager().get(workflow_id).map_err(not_found_as_workflow)?;
    match state.planner.replan(&workflow.original_prompt, &request.answer).await.map_err(ApiError::from)? {
        PlanOutcome::NeedsClarification { question } => {
            state.executor.manager().merge_context(workflow_id, Value::Object(std::collections::BTreeMap::from([(
                "clarifying_question".to_string(),
                Value::String(question),
            )]))).await?;
            let workflow = state.executor.manager().get(workflow_id)?;
            Ok(Json(workflow))
        }
        PlanOutcome::Workflow(generated) => {
            state.executor.manager().replan(workflow_id, generated.tasks, generated.shared_context).await?;
            state.executor.advance(workflow_id).await?;
            let workflow = state.executor.manager().get(workflow_id)?;
            Ok(Json(workflow))
        }
    }
}

async fn create_goal(State(state): State<AppState>, Json(request): Json<CreateGoalRequest>) -> Result<impl IntoResponse, ApiError> {
    let goal = sb_core::Goal {
        goal_id: GoalId::new(),
        objective: request.objective,
        is_active: true,
        conditions: request.conditions,
        remediation_workflow_id: request.remediation_workflow_id,
    };
    state.goals.create(goal.clone())?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn list_goals(State(state): State<AppState>) -> Json<Vec<sb_core::Goal>> {
    Json(state.goals.list_active())
}

async fn get_goal(State(state): State<AppState>, Path(goal_id): Path<GoalId>) -> Result<Json<sb_core::Goal>, ApiError> {
    let goal = state.goals.get(goal_id).map_err(not_found_as_goal)?;
    Ok(Json(goal))
}

fn not_found_as_workflow(err: sb_engine::EngineError) -> ApiError {
    match err {
        sb_engine::EngineError::Store(sb_storage::StoreError::WorkflowNotFound(_)) => ApiError::WorkflowNotFound,
        other => other.into(),
    }
}

fn not_found_as_goal(err: sb_storage::StoreError) -> ApiError {
    match err {
        sb_storage::StoreError::GoalNotFound(_) => ApiError::GoalNotFound,
        other => sb_engine::EngineError::from(other).into(),
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
