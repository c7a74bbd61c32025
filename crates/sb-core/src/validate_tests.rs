// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::status::BlockStatus;
use crate::value::Value;
use crate::workflow::TaskBlock;
use crate::ids::WorkflowId;

fn agent_task(task_id: TaskId, deps: &[TaskId]) -> TaskBlock {
    TaskBlock::AgentTask {
        task_id,
        dependencies: deps.iter().copied().collect(),
        status: BlockStatus::Pending,
        agent_personality: "default".into(),
        prompt: "go".into(),
        condition: None,
        result: None,
    }
}

fn workflow_with(tasks: Vec<TaskBlock>) -> Workflow {
    Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "p".into(),
        status: crate::status::WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks,
        event_id: None,
        created_at: 0,
    }
}

#[test]
fn accepts_valid_linear_chain() {
    let t1 = TaskId::new();
    let t2 = TaskId::new();
    let wf = workflow_with(vec![agent_task(t1, &[]), agent_task(t2, &[t1])]);
    assert!(validate_workflow(&wf).is_ok());
}

#[test]
fn rejects_unknown_dependency() {
    let t1 = TaskId::new();
    let ghost = TaskId::new();
    let wf = workflow_with(vec![agent_task(t1, &[ghost])]);
    assert!(matches!(
        validate_workflow(&wf),
        Err(CoreError::UnknownDependency { .. })
    ));
}

#[test]
fn rejects_cycle() {
    let t1 = TaskId::new();
    let t2 = TaskId::new();
    let wf = workflow_with(vec![agent_task(t1, &[t2]), agent_task(t2, &[t1])]);
    assert!(matches!(
        validate_workflow(&wf),
        Err(CoreError::CyclicDependency(_))
    ));
}
