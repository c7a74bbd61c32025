// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow Worker: evaluates `ConditionalBlock` branches off the
//! conditional-evaluations topic, in parallel with and structurally
//! mirroring the executor's own branch-evaluation logic. The first branch
//! whose guard renders truthy is taken; its siblings' nested blocks are
//! cancelled so they never become dispatch candidates.

use crate::executor::{build_eval_context, untaken_branch_task_ids};
use crate::workflow_manager::WorkflowManager;
use sb_bus::{BusError, MessageBus, SubscriptionType};
use sb_core::{BlockStatus, TaskBlock, Value};
use sb_template::eval_condition;
use sb_wire::{ConditionalEvalMessage, CONDITIONAL_EVALUATIONS};
use std::collections::BTreeMap;
use std::sync::Arc;

pub async fn run_conditional_eval_worker(bus: Arc<dyn MessageBus>, manager: WorkflowManager) -> Result<(), BusError> {
    let mut consumer = bus.subscribe(CONDITIONAL_EVALUATIONS, "workflow-worker", SubscriptionType::Shared).await?;

    loop {
        let message = consumer.receive().await?;
        let job = match message.parse_json::<ConditionalEvalMessage>() {
            Ok(job) => job,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse conditional-eval job, requesting redelivery");
                consumer.nack(&message).await?;
                continue;
            }
        };

        match evaluate(&manager, job).await {
            Ok(()) => consumer.ack(&message).await?,
            Err(err) => {
                tracing::warn!(error = %err, "failed to evaluate conditional block, requesting redelivery");
                consumer.nack(&message).await?;
            }
        }
    }
}

async fn evaluate(manager: &WorkflowManager, job: ConditionalEvalMessage) -> Result<(), crate::EngineError> {
    let workflow = manager.get(job.workflow_id)?;
    let Some(block) = workflow.blocks().get(&job.task_id).copied().cloned() else {
        tracing::warn!(task_id = %job.task_id, "conditional-eval job references unknown block, dropping");
        return Ok(());
    };
    let TaskBlock::ConditionalBlock { branches, .. } = block else {
        tracing::warn!(task_id = %job.task_id, "conditional-eval job references a non-conditional block, dropping");
        return Ok(());
    };

    let context = build_eval_context(&workflow);
    let mut taken: Option<usize> = None;
    for (index, branch) in branches.iter().enumerate() {
        match eval_condition(&branch.condition, &context) {
            Ok(true) => {
                taken = Some(index);
                break;
            }
            Ok(false) => continue,
            Err(err) => {
                manager
                    .update_task_status(job.workflow_id, job.task_id, BlockStatus::Failed, Some(Value::String(err.to_string())), None, "workflow-worker")
                    .await?;
                return Ok(());
            }
        }
    }

    let result = match taken.and_then(|index| branches[index].tasks.first()) {
        Some(first_task) => Value::Object(BTreeMap::from([("branch_taken".to_string(), Value::String(first_task.task_id().to_string()))])),
        None => Value::Null,
    };
    manager
        .update_task_status(job.workflow_id, job.task_id, BlockStatus::Completed, Some(result), None, "workflow-worker")
        .await?;

    for cancelled_id in untaken_branch_task_ids(&branches, taken) {
        manager.update_task_status(job.workflow_id, cancelled_id, BlockStatus::Cancelled, None, None, "workflow-worker").await?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
