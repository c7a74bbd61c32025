// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::MaterializedState;
use sb_core::{BlockStatus, TaskBlock, TaskId, Value, Workflow, WorkflowId, WorkflowStatus};

/// Idempotent: a duplicate `WorkflowCreated` for an already-known workflow
/// id is a no-op rather than an overwrite, so a replayed create can never
/// clobber subsequent task-status updates folded in after it.
pub(super) fn apply_created(state: &mut MaterializedState, workflow: &Workflow) {
    state.workflows.entry(workflow.workflow_id).or_insert_with(|| workflow.clone());
}

/// Idempotent via [`BlockStatus::can_transition_to`]: re-applying a status
/// change whose source status no longer matches (because it already ran
/// once) is silently skipped rather than erroring, since replay must never
/// fail on state it already produced.
pub(super) fn apply_task_status_changed(
    state: &mut MaterializedState,
    workflow_id: &WorkflowId,
    task_id: TaskId,
    status: BlockStatus,
    result: Option<Value>,
    context_updates: Option<Value>,
) {
    let Some(workflow) = state.workflows.get_mut(workflow_id) else {
        return;
    };
    let Some(block) = workflow.find_mut(task_id) else {
        return;
    };

    let current = block.status();
    if current == status {
        return;
    }
    if !current.can_transition_to(status) {
        return;
    }
    block.set_status(status);
    if let Some(result) = result {
        block.set_result(result);
    }

    if let Some(updates) = context_updates {
        workflow.shared_context.deep_merge(updates);
    }

    if let Some(terminal) = workflow.derive_terminal_status() {
        workflow.status = terminal;
    }
}

pub(super) fn apply_workflow_status_changed(
    state: &mut MaterializedState,
    workflow_id: &WorkflowId,
    status: WorkflowStatus,
) {
    if let Some(workflow) = state.workflows.get_mut(workflow_id) {
        workflow.status = status;
    }
}

/// Idempotent: `deep_merge` overwrites leaves by key rather than
/// accumulating, so replaying the same merge twice leaves the context
/// identical to applying it once.
pub(super) fn apply_context_merged(state: &mut MaterializedState, workflow_id: &WorkflowId, context_updates: Value) {
    if let Some(workflow) = state.workflows.get_mut(workflow_id) {
        workflow.shared_context.deep_merge(context_updates);
    }
}

/// Idempotent: only takes effect while the workflow is still
/// `PendingClarification`, so a replayed replan can never clobber a plan
/// that already ran once and moved on to `Running` or beyond.
pub(super) fn apply_replanned(state: &mut MaterializedState, workflow_id: &WorkflowId, tasks: Vec<TaskBlock>, shared_context: Value) {
    if let Some(workflow) = state.workflows.get_mut(workflow_id) {
        if workflow.status == WorkflowStatus::PendingClarification {
            workflow.tasks = tasks;
            workflow.shared_context = shared_context;
            workflow.status = WorkflowStatus::Running;
        }
    }
}
