// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow Executor: given a workflow, dispatches every block whose
//! dependencies are satisfied and which hasn't already started. Runs once
//! per status-update notification; re-running against an unchanged
//! workflow issues zero publishes, since it only ever acts on blocks still
//! in `Pending`.

use crate::dispatcher::{AgentSelector, Dispatcher};
use crate::workflow_manager::WorkflowManager;
use crate::EngineError;
use sb_core::{BlockStatus, Clock, TaskBlock, Value, WorkflowId};
use sb_template::{eval_condition, render_template, TemplateError};
use sb_wire::{ConditionalEvalMessage, DashboardEvent, CONDITIONAL_EVALUATIONS, DASHBOARD_EVENTS};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// Drives one workflow's block graph forward by one step. Owns nothing
/// durable itself; all state lives in the store behind `WorkflowManager`.
pub struct Executor<C: Clock> {
    manager: WorkflowManager,
    dispatcher: Dispatcher<C>,
    bus: Arc<dyn sb_bus::MessageBus>,
    locks: parking_lot::Mutex<BTreeMap<WorkflowId, Arc<AsyncMutex<()>>>>,
}

impl<C: Clock> Executor<C> {
    pub fn new(manager: WorkflowManager, dispatcher: Dispatcher<C>, bus: Arc<dyn sb_bus::MessageBus>) -> Self {
        Self { manager, dispatcher, bus, locks: parking_lot::Mutex::new(BTreeMap::new()) }
    }

    fn lock_for(&self, workflow_id: WorkflowId) -> Arc<AsyncMutex<()>> {
        self.locks.lock().entry(workflow_id).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// The durable-state handle this executor advances against. Exposed so
    /// callers that already hold an `Executor` (the goal monitor, the event
    /// listener) can create or transition workflows without threading a
    /// second handle through their own constructors.
    pub fn manager(&self) -> &WorkflowManager {
        &self.manager
    }

    /// Advance `workflow_id` by one step: dispatch every block whose
    /// dependencies are all completed and which is still `Pending`.
    pub async fn advance(&self, workflow_id: WorkflowId) -> Result<(), EngineError> {
        let lock = self.lock_for(workflow_id);
        let _guard = lock.lock().await;

        let workflow = self.manager.get(workflow_id)?;
        if workflow.status.is_terminal() {
            return Ok(());
        }

        // A workflow with no blocks (or one whose blocks are all already
        // settled) is done on the spot -- nothing will ever emit the
        // task-status-change event that would otherwise drive this.
        if let Some(terminal) = workflow.derive_terminal_status() {
            self.manager.update_workflow_status(workflow_id, terminal).await?;
            return Ok(());
        }

        let completed = workflow.completed_ids();
        let eval_context = build_eval_context(&workflow);
        let blocks = workflow.blocks();

        for (task_id, block) in blocks {
            if block.status() != BlockStatus::Pending {
                continue;
            }
            if !block.dependencies().is_subset(&completed) {
                continue;
            }

            match block {
                TaskBlock::AgentTask { condition, prompt, agent_personality, .. } => {
                    if let Some(condition) = condition {
                        match eval_condition(condition, &eval_context) {
                            Ok(true) => {}
                            Ok(false) => {
                                self.manager
                                    .update_task_status(workflow_id, task_id, BlockStatus::Cancelled, None, None, "executor")
                                    .await?;
                                continue;
                            }
                            Err(err) => {
                                self.fail_block(workflow_id, task_id, &err).await?;
                                continue;
                            }
                        }
                    }

                    match render_template(prompt, &eval_context) {
                        Ok(rendered) => self.dispatch_agent_task(workflow_id, task_id, rendered, agent_personality).await?,
                        Err(err) => self.fail_block(workflow_id, task_id, &err).await?,
                    }
                }
                TaskBlock::ConditionalBlock { .. } => {
                    let message = ConditionalEvalMessage { workflow_id, task_id };
                    sb_bus::publish_json(&*self.bus, CONDITIONAL_EVALUATIONS, &message, BTreeMap::new()).await?;
                    self.manager
                        .update_task_status(workflow_id, task_id, BlockStatus::Dispatched, None, None, "executor")
                        .await?;
                }
                TaskBlock::ApprovalBlock { message, .. } => {
                    self.manager
                        .update_task_status(workflow_id, task_id, BlockStatus::PendingApproval, None, None, "executor")
                        .await?;
                    let event = DashboardEvent {
                        event_type: "APPROVAL_REQUIRED".to_string(),
                        workflow_id: Some(workflow_id),
                        task_id: Some(task_id),
                        data: Value::String(message.clone()),
                    };
                    sb_bus::publish_json(&*self.bus, DASHBOARD_EVENTS, &event, BTreeMap::new()).await?;
                }
            }
        }

        Ok(())
    }

    async fn dispatch_agent_task(
        &self,
        workflow_id: WorkflowId,
        task_id: sb_core::TaskId,
        rendered_prompt: String,
        agent_personality: &str,
    ) -> Result<(), EngineError> {
        let selector = AgentSelector::Prefix(agent_personality.to_string());
        match self.dispatcher.dispatch(rendered_prompt, &selector, Some(task_id), Some(workflow_id), None, None).await {
            Ok(_) => {
                self.manager
                    .update_task_status(workflow_id, task_id, BlockStatus::Dispatched, None, None, "executor")
                    .await
            }
            // No capable agent yet: leave the block Pending so the next
            // status-update notification retries dispatch.
            Err(EngineError::NoAgentAvailable(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn fail_block(&self, workflow_id: WorkflowId, task_id: sb_core::TaskId, err: &TemplateError) -> Result<(), EngineError> {
        self.manager
            .update_task_status(workflow_id, task_id, BlockStatus::Failed, Some(Value::String(err.to_string())), None, "executor")
            .await
    }
}

/// Build the template/condition evaluation context: the workflow's shared
/// context, merged with a `tasks` map of completed `AgentTask` results.
pub fn build_eval_context(workflow: &sb_core::Workflow) -> Value {
    let mut context = workflow.shared_context.clone();
    let mut tasks = BTreeMap::new();
    for (task_id, block) in workflow.blocks() {
        if let TaskBlock::AgentTask { result: Some(result), status, .. } = block {
            if *status == BlockStatus::Completed {
                tasks.insert(task_id.to_string(), result.clone());
            }
        }
    }
    context.deep_merge(Value::Object(BTreeMap::from([("tasks".to_string(), Value::Object(tasks))])));
    context
}

/// All leaf-ward task ids nested under branches other than `taken_branch`,
/// recursively. Used to cancel the branches that weren't selected.
pub fn untaken_branch_task_ids(branches: &[sb_core::ConditionalBranch], taken_branch: Option<usize>) -> BTreeSet<sb_core::TaskId> {
    let mut out = BTreeSet::new();
    for (index, branch) in branches.iter().enumerate() {
        if Some(index) == taken_branch {
            continue;
        }
        for task in &branch.tasks {
            out.insert(task.task_id());
            for nested in task.nested() {
                out.insert(nested.task_id());
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
