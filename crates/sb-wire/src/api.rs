// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response DTOs for the HTTP API surface.

use sb_core::{GoalCondition, TaskId, Value, WorkflowId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTaskRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitTaskResponse {
    pub workflow_id: WorkflowId,
    pub status: String,
    pub num_tasks: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifying_question: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApproveTaskRequest {
    pub approved: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClarifyRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoalRequest {
    pub objective: String,
    #[serde(default)]
    pub conditions: Vec<GoalCondition>,
    #[serde(default)]
    pub remediation_workflow_id: Option<WorkflowId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardEvent {
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub data: Value,
}

impl SubmitTaskResponse {
    pub const ACCEPTED_WORKFLOW: &'static str = "Workflow accepted for execution.";
    pub const ACCEPTED_SINGLE_TASK: &'static str = "Dispatched as single task.";
    pub const PENDING_CLARIFICATION: &'static str = "PENDING_CLARIFICATION";
}
