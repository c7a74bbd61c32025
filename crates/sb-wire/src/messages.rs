// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes published and consumed on the message bus.

use sb_core::{AgentId, TaskId, WorkflowId};
use serde::{Deserialize, Serialize};

/// Published by the dispatcher to an agent's inbox topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessage {
    pub id: String,
    pub prompt: String,
    pub model: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_personality: Option<String>,
}

/// Published by an agent on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub id: String,
    pub result: String,
    pub llm_model: String,
    pub prompt: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_personality: Option<String>,
}

/// Published by workers that advance workflow state asynchronously (the
/// conditional-branch evaluator, the goal monitor's remediation trigger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateMessage {
    pub workflow_id: WorkflowId,
    pub task_id: TaskId,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Published on the registration topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationMessage {
    pub agent_id: AgentId,
    pub task_topic: String,
    pub personality: String,
}

/// Published on the registration topic when an agent cleanly shuts down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnregistrationMessage {
    pub agent_id: AgentId,
}

/// A job submitted for parallel evaluation on the conditional-evaluations
/// topic: the id of the ConditionalBlock and the rendering context it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalEvalMessage {
    pub workflow_id: WorkflowId,
    pub task_id: TaskId,
}
