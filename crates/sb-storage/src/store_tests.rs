// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sb_core::{BlockStatus, Goal, TaskBlock, WorkflowStatus};
use std::collections::BTreeSet;
use tempfile::tempdir;

fn sample_workflow() -> Workflow {
    Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "investigate latency spike".to_string(),
        status: WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks: vec![TaskBlock::AgentTask {
            task_id: TaskId::new(),
            dependencies: BTreeSet::new(),
            status: BlockStatus::Pending,
            agent_personality: "sre".to_string(),
            prompt: "check dashboards".to_string(),
            condition: None,
            result: None,
        }],
        event_id: None,
        created_at: 0,
    }
}

#[test]
fn create_and_get_workflow_round_trips() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let workflow = sample_workflow();

    workflows.create(workflow.clone()).expect("create");
    let fetched = workflows.get(workflow.workflow_id).expect("get");
    assert_eq!(fetched, workflow);
}

#[test]
fn creating_duplicate_workflow_id_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let workflow = sample_workflow();

    workflows.create(workflow.clone()).expect("create");
    let err = workflows.create(workflow.clone()).unwrap_err();
    assert!(matches!(err, StoreError::WorkflowAlreadyExists(_)));
}

#[test]
fn update_task_status_rejects_illegal_transition() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let workflow = sample_workflow();
    let task_id = workflow.tasks[0].task_id();
    workflows.create(workflow.clone()).expect("create");

    let err = workflows
        .update_task_status(workflow.workflow_id, task_id, BlockStatus::Completed, None, None)
        .unwrap_err();
    assert!(matches!(err, StoreError::IllegalTransition { .. }));
}

#[test]
fn update_task_status_completes_workflow_when_all_blocks_settle() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let workflow = sample_workflow();
    let task_id = workflow.tasks[0].task_id();
    workflows.create(workflow.clone()).expect("create");

    workflows
        .update_task_status(workflow.workflow_id, task_id, BlockStatus::Dispatched, None, None)
        .expect("dispatch");
    workflows
        .update_task_status(
            workflow.workflow_id,
            task_id,
            BlockStatus::Completed,
            Some(Value::String("ok".to_string())),
            None,
        )
        .expect("complete");

    let fetched = workflows.get(workflow.workflow_id).expect("get");
    assert_eq!(fetched.status, WorkflowStatus::Completed);
}

#[test]
fn list_running_excludes_terminal_workflows() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let running = sample_workflow();
    let mut completed = sample_workflow();
    completed.status = WorkflowStatus::Completed;

    workflows.create(running.clone()).expect("create running");
    workflows.create(completed).expect("create completed");

    let active = workflows.list_running();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].workflow_id, running.workflow_id);
}

#[test]
fn merge_context_deep_merges_into_shared_context() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let workflow = sample_workflow();
    workflows.create(workflow.clone()).expect("create");

    let patch: Value = serde_json::json!({"region": "us-east-1"}).into();
    workflows.merge_context(workflow.workflow_id, patch).expect("merge");

    let fetched = workflows.get(workflow.workflow_id).expect("get");
    assert_eq!(fetched.shared_context.get_path("region"), Some(&Value::String("us-east-1".to_string())));
}

#[test]
fn merge_context_rejects_unknown_workflow() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();

    let err = workflows.merge_context(WorkflowId::new(), Value::default()).unwrap_err();
    assert!(matches!(err, StoreError::WorkflowNotFound(_)));
}

#[test]
fn replan_replaces_tasks_and_moves_workflow_to_running() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let mut workflow = sample_workflow();
    workflow.status = WorkflowStatus::PendingClarification;
    workflow.tasks = Vec::new();
    workflows.create(workflow.clone()).expect("create");

    let new_tasks = vec![TaskBlock::AgentTask {
        task_id: TaskId::new(),
        dependencies: BTreeSet::new(),
        status: BlockStatus::Pending,
        agent_personality: "sre".to_string(),
        prompt: "reduce latency".to_string(),
        condition: None,
        result: None,
    }];
    workflows.replan(workflow.workflow_id, new_tasks.clone(), Value::default()).expect("replan");

    let fetched = workflows.get(workflow.workflow_id).expect("get");
    assert_eq!(fetched.status, WorkflowStatus::Running);
    assert_eq!(fetched.tasks.len(), 1);
}

#[test]
fn replan_rejects_a_workflow_that_is_not_pending_clarification() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let workflows = store.workflows();
    let workflow = sample_workflow();
    workflows.create(workflow.clone()).expect("create");

    let err = workflows.replan(workflow.workflow_id, Vec::new(), Value::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotPendingClarification(_)));
}

#[test]
fn goal_create_update_and_list_active() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let goals = store.goals();
    let goal = Goal::builder().objective("keep error rate low").build();

    goals.create(goal.clone()).expect("create");
    assert_eq!(goals.list_active().len(), 1);

    let mut updated = goal.clone();
    updated.is_active = false;
    goals.update(updated).expect("update");
    assert!(goals.list_active().is_empty());
}

#[test]
fn reopening_store_replays_wal_into_materialized_state() {
    let dir = tempdir().expect("tempdir");
    let workflow = sample_workflow();
    {
        let store = Store::open(dir.path()).expect("open");
        store.workflows().create(workflow.clone()).expect("create");
    }

    let store = Store::open(dir.path()).expect("reopen");
    let fetched = store.workflows().get(workflow.workflow_id).expect("get");
    assert_eq!(fetched, workflow);
}

#[test]
fn checkpoint_then_reopen_still_recovers_state() {
    let dir = tempdir().expect("tempdir");
    let workflow = sample_workflow();
    {
        let store = Store::open(dir.path()).expect("open");
        store.workflows().create(workflow.clone()).expect("create");
        store.checkpoint().expect("checkpoint");
    }

    let store = Store::open(dir.path()).expect("reopen");
    let fetched = store.workflows().get(workflow.workflow_id).expect("get");
    assert_eq!(fetched, workflow);
}
