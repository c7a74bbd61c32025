// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn agent_task(task_id: TaskId, deps: &[TaskId], status: BlockStatus) -> TaskBlock {
    TaskBlock::AgentTask {
        task_id,
        dependencies: deps.iter().copied().collect(),
        status,
        agent_personality: "default".into(),
        prompt: "do work".into(),
        condition: None,
        result: None,
    }
}

fn empty_workflow() -> Workflow {
    Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "do the thing".into(),
        status: WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks: Vec::new(),
        event_id: None,
        created_at: 0,
    }
}

#[test]
fn zero_task_workflow_is_immediately_complete() {
    let wf = empty_workflow();
    assert_eq!(wf.derive_terminal_status(), Some(WorkflowStatus::Completed));
}

#[test]
fn incomplete_blocks_yield_no_terminal_status() {
    let mut wf = empty_workflow();
    wf.tasks.push(agent_task(TaskId::new(), &[], BlockStatus::Pending));
    assert_eq!(wf.derive_terminal_status(), None);
}

#[test]
fn any_failed_block_fails_the_workflow() {
    let mut wf = empty_workflow();
    let t1 = TaskId::new();
    wf.tasks.push(agent_task(t1, &[], BlockStatus::Failed));
    wf.tasks.push(agent_task(TaskId::new(), &[], BlockStatus::Completed));
    assert_eq!(wf.derive_terminal_status(), Some(WorkflowStatus::Failed));
}

#[test]
fn cancelled_blocks_do_not_block_completion() {
    let mut wf = empty_workflow();
    wf.tasks.push(agent_task(TaskId::new(), &[], BlockStatus::Cancelled));
    wf.tasks.push(agent_task(TaskId::new(), &[], BlockStatus::Completed));
    assert_eq!(wf.derive_terminal_status(), Some(WorkflowStatus::Completed));
}

#[test]
fn blocks_flattens_conditional_branches() {
    let mut wf = empty_workflow();
    let nested_id = TaskId::new();
    let cond_id = TaskId::new();
    wf.tasks.push(TaskBlock::ConditionalBlock {
        task_id: cond_id,
        dependencies: Default::default(),
        status: BlockStatus::Pending,
        branches: vec![ConditionalBranch {
            condition: "true".into(),
            tasks: vec![agent_task(nested_id, &[], BlockStatus::Pending)],
        }],
        result: None,
    });
    let blocks = wf.blocks();
    assert!(blocks.contains_key(&cond_id));
    assert!(blocks.contains_key(&nested_id));
}

#[test]
fn find_mut_locates_nested_block() {
    let mut wf = empty_workflow();
    let nested_id = TaskId::new();
    wf.tasks.push(TaskBlock::ConditionalBlock {
        task_id: TaskId::new(),
        dependencies: Default::default(),
        status: BlockStatus::Pending,
        branches: vec![ConditionalBranch {
            condition: "true".into(),
            tasks: vec![agent_task(nested_id, &[], BlockStatus::Pending)],
        }],
        result: None,
    });
    let found = wf.find_mut(nested_id).expect("nested block present");
    found.set_status(BlockStatus::Completed);
    assert_eq!(wf.blocks()[&nested_id].status(), BlockStatus::Completed);
}
