// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable event log entries. Every accepted mutation of workflow or goal
//! state is appended here before the in-memory materialized maps are
//! updated, so a crash between the two can always be recovered by replay.

use sb_core::{AgentId, AgentRegistration, BlockStatus, Goal, TaskBlock, TaskId, Value, Workflow, WorkflowId, WorkflowStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkflowCreated {
        workflow: Workflow,
    },
    TaskStatusChanged {
        workflow_id: WorkflowId,
        task_id: TaskId,
        status: BlockStatus,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        context_updates: Option<Value>,
    },
    WorkflowStatusChanged {
        workflow_id: WorkflowId,
        status: WorkflowStatus,
    },
    WorkflowContextMerged {
        workflow_id: WorkflowId,
        context_updates: Value,
    },
    /// A clarified goal settling on a concrete plan: replaces the empty
    /// task list a `PendingClarification` workflow was created with.
    WorkflowReplanned {
        workflow_id: WorkflowId,
        tasks: Vec<TaskBlock>,
        shared_context: Value,
    },
    AgentRegistered {
        registration: AgentRegistration,
    },
    AgentUnregistered {
        agent_id: AgentId,
    },
    GoalCreated {
        goal: Goal,
    },
    GoalUpdated {
        goal: Goal,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::AgentId;

    #[test]
    fn tagged_event_round_trips_through_json() {
        let event = Event::AgentUnregistered { agent_id: AgentId::from_string("agt-0000000000000000001") };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"type\":\"AgentUnregistered\""));
        let parsed: Event = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, event);
    }
}
