// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow graph: an arena of [`TaskBlock`]s addressed by [`TaskId`],
//! never by direct pointer, so the recursive conditional-branch relation
//! cannot form an ownership cycle.

use crate::ids::{EventId, TaskId, WorkflowId};
use crate::status::{BlockStatus, WorkflowStatus};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBranch {
    /// Templated boolean predicate; the first branch that renders truthy is taken.
    pub condition: String,
    pub tasks: Vec<TaskBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TaskBlock {
    AgentTask {
        task_id: TaskId,
        #[serde(default)]
        dependencies: BTreeSet<TaskId>,
        status: BlockStatus,
        agent_personality: String,
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
    ConditionalBlock {
        task_id: TaskId,
        #[serde(default)]
        dependencies: BTreeSet<TaskId>,
        status: BlockStatus,
        branches: Vec<ConditionalBranch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
    ApprovalBlock {
        task_id: TaskId,
        #[serde(default)]
        dependencies: BTreeSet<TaskId>,
        status: BlockStatus,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        required_role: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
}

impl TaskBlock {
    pub fn task_id(&self) -> TaskId {
        match self {
            TaskBlock::AgentTask { task_id, .. }
            | TaskBlock::ConditionalBlock { task_id, .. }
            | TaskBlock::ApprovalBlock { task_id, .. } => *task_id,
        }
    }

    pub fn status(&self) -> BlockStatus {
        match self {
            TaskBlock::AgentTask { status, .. }
            | TaskBlock::ConditionalBlock { status, .. }
            | TaskBlock::ApprovalBlock { status, .. } => *status,
        }
    }

    pub fn set_status(&mut self, next: BlockStatus) {
        match self {
            TaskBlock::AgentTask { status, .. }
            | TaskBlock::ConditionalBlock { status, .. }
            | TaskBlock::ApprovalBlock { status, .. } => *status = next,
        }
    }

    pub fn dependencies(&self) -> &BTreeSet<TaskId> {
        match self {
            TaskBlock::AgentTask { dependencies, .. }
            | TaskBlock::ConditionalBlock { dependencies, .. }
            | TaskBlock::ApprovalBlock { dependencies, .. } => dependencies,
        }
    }

    pub fn set_result(&mut self, value: Value) {
        match self {
            TaskBlock::AgentTask { result, .. }
            | TaskBlock::ConditionalBlock { result, .. }
            | TaskBlock::ApprovalBlock { result, .. } => *result = Some(value),
        }
    }

    /// All blocks nested inside this one, recursively (branches of a
    /// ConditionalBlock), not including `self`.
    pub fn nested(&self) -> Vec<&TaskBlock> {
        let mut out = Vec::new();
        if let TaskBlock::ConditionalBlock { branches, .. } = self {
            for branch in branches {
                for task in &branch.tasks {
                    out.push(task);
                    out.extend(task.nested());
                }
            }
        }
        out
    }

}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub original_prompt: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub shared_context: Value,
    pub tasks: Vec<TaskBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    pub created_at: u64,
}

impl Workflow {
    /// Flatten the recursive block tree into a lookup table by task id.
    pub fn blocks(&self) -> BTreeMap<TaskId, &TaskBlock> {
        let mut map = BTreeMap::new();
        for task in &self.tasks {
            map.insert(task.task_id(), task);
            for nested in task.nested() {
                map.insert(nested.task_id(), nested);
            }
        }
        map
    }

    pub fn find_mut(&mut self, task_id: TaskId) -> Option<&mut TaskBlock> {
        for task in &mut self.tasks {
            if task.task_id() == task_id {
                return Some(task);
            }
            if let Some(found) = find_in_children(task, task_id) {
                return Some(found);
            }
        }
        None
    }

    /// All block ids whose status is `Completed`.
    pub fn completed_ids(&self) -> BTreeSet<TaskId> {
        self.blocks()
            .into_iter()
            .filter(|(_, b)| b.status() == BlockStatus::Completed)
            .map(|(id, _)| id)
            .collect()
    }

    /// Workflow-level terminal status derived from block statuses (I6):
    /// COMPLETED if every non-cancelled block is COMPLETED, FAILED if any is
    /// FAILED, otherwise `None` (still in progress).
    pub fn derive_terminal_status(&self) -> Option<WorkflowStatus> {
        let blocks = self.blocks();
        if blocks.values().any(|b| b.status() == BlockStatus::Failed) {
            return Some(WorkflowStatus::Failed);
        }
        let all_settled = blocks.values().all(|b| b.status().is_terminal());
        if all_settled {
            Some(WorkflowStatus::Completed)
        } else {
            None
        }
    }
}

fn find_in_children(block: &mut TaskBlock, task_id: TaskId) -> Option<&mut TaskBlock> {
    if let TaskBlock::ConditionalBlock { branches, .. } = block {
        for branch in branches {
            for task in &mut branch.tasks {
                if task.task_id() == task_id {
                    return Some(task);
                }
                if let Some(found) = find_in_children(task, task_id) {
                    return Some(found);
                }
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
