// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::AgentRegistry;
use sb_bus::{InMemoryBus, MessageBus};
use sb_core::{AgentId, AgentRegistration, BlockStatus, FakeClock, TaskBlock, TaskId, Value, Workflow, WorkflowStatus};
use std::collections::BTreeSet;
use tempfile::tempdir;

fn harness() -> (tempfile::TempDir, Executor<FakeClock>, WorkflowManager, Arc<dyn MessageBus>, AgentRegistry) {
    let dir = tempdir().expect("tempdir");
    let store = sb_storage::Store::open(dir.path()).expect("open");
    let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new());
    let registry = AgentRegistry::new();
    registry.register(AgentRegistration {
        agent_id: AgentId::from_string("agt-1"),
        task_topic: sb_wire::agent_task_topic(AgentId::from_string("agt-1")),
        personality: "sre".to_string(),
    });
    let manager = WorkflowManager::new(store.workflows(), bus.clone());
    let dispatcher = Dispatcher::new(bus.clone(), registry.clone(), FakeClock::new());
    let executor = Executor::new(manager.clone(), dispatcher, bus.clone());
    (dir, executor, manager, bus, registry)
}

fn agent_task(task_id: TaskId, deps: &[TaskId], prompt: &str) -> TaskBlock {
    TaskBlock::AgentTask {
        task_id,
        dependencies: deps.iter().copied().collect(),
        status: BlockStatus::Pending,
        agent_personality: "sre".to_string(),
        prompt: prompt.to_string(),
        condition: None,
        result: None,
    }
}

fn sample_workflow(tasks: Vec<TaskBlock>) -> Workflow {
    Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "investigate".to_string(),
        status: WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks,
        event_id: None,
        created_at: 0,
    }
}

#[tokio::test]
async fn advance_dispatches_a_ready_agent_task() {
    let (_dir, executor, manager, _bus, _registry) = harness();
    let task_id = TaskId::new();
    let workflow = sample_workflow(vec![agent_task(task_id, &[], "check the dashboards")]);
    manager.create(workflow.clone()).expect("create");

    executor.advance(workflow.workflow_id).await.expect("advance");

    let updated = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(updated.blocks().get(&task_id).expect("block").status(), BlockStatus::Dispatched);
}

#[tokio::test]
async fn advance_only_dispatches_dependents_once_their_dependency_completes() {
    let (_dir, executor, manager, _bus, _registry) = harness();
    let first = TaskId::new();
    let second = TaskId::new();
    let workflow = sample_workflow(vec![agent_task(first, &[], "step one"), agent_task(second, &[first], "step two")]);
    manager.create(workflow.clone()).expect("create");

    executor.advance(workflow.workflow_id).await.expect("advance first pass");
    let mid = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(mid.blocks().get(&second).expect("second").status(), BlockStatus::Pending);

    manager
        .update_task_status(workflow.workflow_id, first, BlockStatus::Completed, Some(Value::String("ok".into())), None, "test")
        .await
        .expect("complete first");
    executor.advance(workflow.workflow_id).await.expect("advance second pass");

    let done = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(done.blocks().get(&second).expect("second").status(), BlockStatus::Dispatched);
}

#[tokio::test]
async fn advance_cancels_a_block_whose_condition_is_false() {
    let (_dir, executor, manager, _bus, _registry) = harness();
    let task_id = TaskId::new();
    let mut workflow = sample_workflow(vec![agent_task(task_id, &[], "maybe run")]);
    if let TaskBlock::AgentTask { condition, .. } = &mut workflow.tasks[0] {
        *condition = Some("false".to_string());
    }
    manager.create(workflow.clone()).expect("create");

    executor.advance(workflow.workflow_id).await.expect("advance");

    let updated = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(updated.blocks().get(&task_id).expect("block").status(), BlockStatus::Cancelled);
}

#[tokio::test]
async fn advance_fails_a_block_with_an_unrenderable_prompt() {
    let (_dir, executor, manager, _bus, _registry) = harness();
    let task_id = TaskId::new();
    let workflow = sample_workflow(vec![agent_task(task_id, &[], "{{ unterminated")]);
    manager.create(workflow.clone()).expect("create");

    executor.advance(workflow.workflow_id).await.expect("advance");

    let updated = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(updated.blocks().get(&task_id).expect("block").status(), BlockStatus::Failed);
}

#[tokio::test]
async fn advance_on_a_terminal_workflow_is_a_no_op() {
    let (_dir, executor, manager, _bus, _registry) = harness();
    let task_id = TaskId::new();
    let workflow = sample_workflow(vec![agent_task(task_id, &[], "done already")]);
    manager.create(workflow.clone()).expect("create");
    manager.update_workflow_status(workflow.workflow_id, WorkflowStatus::Completed).await.expect("complete");

    executor.advance(workflow.workflow_id).await.expect("advance");

    let updated = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(updated.blocks().get(&task_id).expect("block").status(), BlockStatus::Pending);
}

#[tokio::test]
async fn advance_on_approval_block_transitions_to_pending_approval() {
    let (_dir, executor, manager, _bus, _registry) = harness();
    let task_id = TaskId::new();
    let workflow = sample_workflow(vec![TaskBlock::ApprovalBlock {
        task_id,
        dependencies: BTreeSet::new(),
        status: BlockStatus::Pending,
        message: "approve the rollout?".to_string(),
        required_role: None,
        result: None,
    }]);
    manager.create(workflow.clone()).expect("create");

    executor.advance(workflow.workflow_id).await.expect("advance");

    let updated = manager.get(workflow.workflow_id).expect("get");
    assert_eq!(updated.blocks().get(&task_id).expect("block").status(), BlockStatus::PendingApproval);
}
