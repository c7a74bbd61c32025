// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result & Status Listener: applies agent results and externally-sourced
//! status updates to durable workflow state, then nudges the executor to
//! advance. A companion dead-letter reaper marks tasks whose messages
//! exceeded the bus's redelivery bound as failed rather than leaving them
//! stuck forever.

use crate::executor::Executor;
use crate::workflow_manager::WorkflowManager;
use sb_bus::{BusError, MessageBus, SubscriptionType};
use sb_core::{BlockStatus, Clock, TaskId, Value};
use sb_wire::{dead_letter_topic, ResultMessage, StatusUpdateMessage, RESULTS, TASK_STATUS_UPDATES};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Futures table for the synchronous-delegation path: a caller that
/// dispatched a task directly (outside any workflow) and wants to await
/// its result rather than poll for it registers here, keyed by `task_id`.
/// The result consumer fulfills and removes the entry as soon as a
/// matching result arrives; a caller that times out calls `abandon`
/// instead, and a late-arriving result for an abandoned task is tolerated
/// as a harmless dropped send.
#[derive(Clone, Default)]
pub struct DelegationTable {
    inner: Arc<parking_lot::Mutex<HashMap<TaskId, oneshot::Sender<Value>>>>,
}

impl DelegationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `task_id`'s result. The receiver resolves
    /// exactly once, whenever the matching result lands on the results
    /// topic; pair every call with either awaiting the receiver to
    /// completion or, on timeout, calling `abandon`.
    pub fn register(&self, task_id: TaskId) -> oneshot::Receiver<Value> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().insert(task_id, tx);
        rx
    }

    /// Removes a registration the caller has given up waiting on. A no-op
    /// if the result already arrived and fulfilled (and removed) it first.
    pub fn abandon(&self, task_id: &TaskId) {
        self.inner.lock().remove(task_id);
    }

    /// Fulfils and removes the registration for `task_id`, if any is
    /// still pending. Returns whether one existed. Tolerates a receiver
    /// that was already dropped by an abandoned caller.
    fn fulfill(&self, task_id: &TaskId, value: Value) -> bool {
        match self.inner.lock().remove(task_id) {
            Some(tx) => {
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }
}

fn parse_block_status(s: &str) -> Option<BlockStatus> {
    Some(match s {
        "PENDING" => BlockStatus::Pending,
        "DISPATCHED" => BlockStatus::Dispatched,
        "PENDING_APPROVAL" => BlockStatus::PendingApproval,
        "COMPLETED" => BlockStatus::Completed,
        "FAILED" => BlockStatus::Failed,
        "CANCELLED" => BlockStatus::Cancelled,
        _ => return None,
    })
}

/// Consume agent results. A result for a task with a registered
/// synchronous-delegation future is routed there and goes no further;
/// otherwise it's applied as a `Completed` task transition against
/// workflow state.
pub async fn run_result_consumer(bus: Arc<dyn MessageBus>, manager: WorkflowManager, delegation: DelegationTable) -> Result<(), BusError> {
    let mut consumer = bus.subscribe(RESULTS, "result-listener", SubscriptionType::Shared).await?;

    loop {
        let message = consumer.receive().await?;
        let parsed = message.parse_json::<ResultMessage>();
        let result = match parsed {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse result message, requesting redelivery");
                consumer.nack(&message).await?;
                continue;
            }
        };

        let value = Value::from_agent_result(&result.result);

        if let Some(task_id) = result.task_id {
            if delegation.fulfill(&task_id, value.clone()) {
                consumer.ack(&message).await?;
                continue;
            }
        }

        let (Some(workflow_id), Some(task_id)) = (result.workflow_id, result.task_id) else {
            tracing::warn!("result message missing workflow/task correlation, dropping");
            consumer.ack(&message).await?;
            continue;
        };

        match manager.update_task_status(workflow_id, task_id, BlockStatus::Completed, Some(value), None, "result-listener").await {
            Ok(()) => {
                consumer.ack(&message).await?;
            }
            Err(err) => {
                tracing::warn!(error = %err, %workflow_id, %task_id, "failed to apply task result, requesting redelivery");
                consumer.nack(&message).await?;
            }
        }
    }
}

/// Consume status updates published by the workflow manager itself (after
/// a result or approval lands) and by the conditional-branch worker and
/// goal monitor. Applying a status that has already settled is a no-op;
/// the executor is nudged regardless so it can pick up newly-eligible
/// blocks.
pub async fn run_status_update_consumer<C: Clock + 'static>(
    bus: Arc<dyn MessageBus>,
    manager: WorkflowManager,
    executor: Arc<Executor<C>>,
) -> Result<(), BusError> {
    let mut consumer = bus.subscribe(TASK_STATUS_UPDATES, "status-listener", SubscriptionType::Shared).await?;

    loop {
        let message = consumer.receive().await?;
        let parsed = message.parse_json::<StatusUpdateMessage>();
        let update = match parsed {
            Ok(update) => update,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse status update message, requesting redelivery");
                consumer.nack(&message).await?;
                continue;
            }
        };

        let Some(status) = parse_block_status(&update.status) else {
            tracing::warn!(status = %update.status, "unknown block status in status update message, dropping");
            consumer.ack(&message).await?;
            continue;
        };

        let source = update.source.as_deref().unwrap_or("status-listener");
        let apply = manager
            .update_task_status(update.workflow_id, update.task_id, status, update.result.map(Value::String), None, source)
            .await;
        if let Err(err) = apply {
            tracing::warn!(error = %err, "failed to apply status update, requesting redelivery");
            consumer.nack(&message).await?;
            continue;
        }

        if let Err(err) = executor.advance(update.workflow_id).await {
            tracing::warn!(error = %err, workflow_id = %update.workflow_id, "failed to advance workflow after status update");
        }
        consumer.ack(&message).await?;
    }
}

/// Drain `source_topic`'s dead-letter topic, marking any task referenced by
/// a dead-lettered message as failed. Runs forever; pair one instance with
/// each of the results and status-update topics.
pub async fn run_dead_letter_reaper(bus: Arc<dyn MessageBus>, manager: WorkflowManager, source_topic: &str) -> Result<(), BusError> {
    let topic = dead_letter_topic(source_topic);
    let mut consumer = bus.subscribe(&topic, "dlq-reaper", SubscriptionType::Shared).await?;

    loop {
        let message = consumer.receive().await?;
        let correlation = message
            .parse_json::<ResultMessage>()
            .map(|r| (r.workflow_id, r.task_id))
            .or_else(|_| message.parse_json::<StatusUpdateMessage>().map(|u| (Some(u.workflow_id), Some(u.task_id))));

        if let Ok((Some(workflow_id), Some(task_id))) = correlation {
            let outcome = manager
                .update_task_status(
                    workflow_id,
                    task_id,
                    BlockStatus::Failed,
                    Some(Value::String("dead-lettered".to_string())),
                    None,
                    "dlq-reaper",
                )
                .await;
            if let Err(err) = outcome {
                tracing::warn!(error = %err, %workflow_id, %task_id, "failed to mark dead-lettered task as failed");
            }
        } else {
            tracing::warn!(topic = %topic, "dead-lettered message carries no task correlation, dropping");
        }
        consumer.ack(&message).await?;
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
