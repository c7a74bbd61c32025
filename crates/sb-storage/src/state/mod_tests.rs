// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sb_core::{BlockStatus, TaskBlock, TaskId, WorkflowId, WorkflowStatus};
use std::collections::BTreeSet;

fn sample_workflow(id: WorkflowId) -> Workflow {
    Workflow {
        workflow_id: id,
        original_prompt: "do the thing".to_string(),
        status: WorkflowStatus::Running,
        shared_context: sb_core::Value::default(),
        tasks: vec![TaskBlock::AgentTask {
            task_id: TaskId::from_string("tsk-0000000000000000001"),
            dependencies: BTreeSet::new(),
            status: BlockStatus::Pending,
            agent_personality: "researcher".to_string(),
            prompt: "gather data".to_string(),
            condition: None,
            result: None,
        }],
        event_id: None,
        created_at: 0,
    }
}

#[test]
fn workflow_created_is_idempotent_on_replay() {
    let mut state = MaterializedState::new();
    let workflow = sample_workflow(WorkflowId::from_string("wfl-0000000000000000001"));
    let event = Event::WorkflowCreated { workflow: workflow.clone() };

    state.apply_event(&event);
    state.apply_event(&event);

    assert_eq!(state.workflows.len(), 1);
    assert_eq!(state.workflows[&workflow.workflow_id], workflow);
}

#[test]
fn task_status_changed_applies_legal_transition_and_sets_result() {
    let mut state = MaterializedState::new();
    let workflow = sample_workflow(WorkflowId::from_string("wfl-0000000000000000002"));
    let task_id = workflow.tasks[0].task_id();
    state.apply_event(&Event::WorkflowCreated { workflow: workflow.clone() });

    state.apply_event(&Event::TaskStatusChanged {
        workflow_id: workflow.workflow_id,
        task_id,
        status: BlockStatus::Dispatched,
        result: None,
        context_updates: None,
    });
    state.apply_event(&Event::TaskStatusChanged {
        workflow_id: workflow.workflow_id,
        task_id,
        status: BlockStatus::Completed,
        result: Some(sb_core::Value::String("done".to_string())),
        context_updates: None,
    });

    let stored = &state.workflows[&workflow.workflow_id];
    assert_eq!(stored.tasks[0].status(), BlockStatus::Completed);
    assert_eq!(stored.status, WorkflowStatus::Completed);
}

#[test]
fn duplicate_task_status_change_is_ignored() {
    let mut state = MaterializedState::new();
    let workflow = sample_workflow(WorkflowId::from_string("wfl-0000000000000000003"));
    let task_id = workflow.tasks[0].task_id();
    state.apply_event(&Event::WorkflowCreated { workflow: workflow.clone() });

    let dispatch = Event::TaskStatusChanged {
        workflow_id: workflow.workflow_id,
        task_id,
        status: BlockStatus::Dispatched,
        result: None,
        context_updates: None,
    };
    state.apply_event(&dispatch);
    state.apply_event(&dispatch);

    assert_eq!(state.workflows[&workflow.workflow_id].tasks[0].status(), BlockStatus::Dispatched);
}

#[test]
fn agent_registration_and_unregistration_round_trip() {
    let mut state = MaterializedState::new();
    let registration = sb_core::AgentRegistration {
        agent_id: sb_core::AgentId::from_string("agt-0000000000000000001"),
        task_topic: "agent_task.agt-1".to_string(),
        personality: "researcher".to_string(),
    };
    state.apply_event(&Event::AgentRegistered { registration: registration.clone() });
    assert!(state.agents.contains_key(&registration.agent_id));

    state.apply_event(&Event::AgentUnregistered { agent_id: registration.agent_id });
    assert!(!state.agents.contains_key(&registration.agent_id));
}
