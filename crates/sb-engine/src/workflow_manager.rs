// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sole writer of durable workflow state. Every accepted status transition
//! is both committed to the store and mirrored onto the bus: a
//! `StatusUpdateMessage` for the executor and worker to react to, and a
//! `DashboardEvent` for observers. Events are only published once the
//! transition is durable, never before.

use sb_core::{BlockStatus, TaskBlock, TaskId, Value, Workflow, WorkflowId, WorkflowStatus};
use sb_storage::{StoreError, WorkflowStore};
use sb_wire::{DashboardEvent, StatusUpdateMessage, DASHBOARD_EVENTS, TASK_STATUS_UPDATES};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::EngineError;

#[derive(Clone)]
pub struct WorkflowManager {
    store: WorkflowStore,
    bus: Arc<dyn sb_bus::MessageBus>,
}

impl WorkflowManager {
    pub fn new(store: WorkflowStore, bus: Arc<dyn sb_bus::MessageBus>) -> Self {
        Self { store, bus }
    }

    pub fn create(&self, workflow: Workflow) -> Result<(), EngineError> {
        self.store.create(workflow).map_err(Into::into)
    }

    pub fn get(&self, workflow_id: WorkflowId) -> Result<Workflow, EngineError> {
        self.store.get(workflow_id).map_err(Into::into)
    }

    pub fn get_by_event_id(&self, event_id: sb_core::EventId) -> Option<Workflow> {
        self.store.get_by_event_id(event_id)
    }

    pub fn list_running(&self) -> Vec<Workflow> {
        self.store.list_running()
    }

    /// Apply a task status transition. A transition that is no longer legal
    /// because the block already settled (a duplicate delivery of the same
    /// result, or a race between two sources reporting the same outcome) is
    /// treated as a no-op rather than an error, matching the at-least-once
    /// delivery guarantees of the bus this sits behind.
    pub async fn update_task_status(
        &self,
        workflow_id: WorkflowId,
        task_id: TaskId,
        status: BlockStatus,
        result: Option<Value>,
        context_updates: Option<Value>,
        source: &str,
    ) -> Result<(), EngineError> {
        match self.store.update_task_status(workflow_id, task_id, status, result.clone(), context_updates) {
            Ok(()) => {
                self.publish_status_update(workflow_id, task_id, status, result, source).await?;
                self.publish_task_status_dashboard_event(workflow_id, task_id, status).await?;
                if let Ok(workflow) = self.store.get(workflow_id) {
                    if workflow.status.is_terminal() {
                        self.publish_workflow_terminal_dashboard_event(&workflow).await?;
                    }
                }
                Ok(())
            }
            Err(StoreError::IllegalTransition { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_workflow_status(&self, workflow_id: WorkflowId, status: WorkflowStatus) -> Result<(), EngineError> {
        self.store.update_workflow_status(workflow_id, status)?;
        if let Ok(workflow) = self.store.get(workflow_id) {
            if workflow.status.is_terminal() {
                self.publish_workflow_terminal_dashboard_event(&workflow).await?;
            }
        }
        Ok(())
    }

    /// Merge a caller-supplied patch into the workflow's shared context.
    pub async fn merge_context(&self, workflow_id: WorkflowId, context_updates: Value) -> Result<(), EngineError> {
        self.store.merge_context(workflow_id, context_updates)?;
        let event = DashboardEvent {
            event_type: "CONTEXT_UPDATED".to_string(),
            workflow_id: Some(workflow_id),
            task_id: None,
            data: Value::Null,
        };
        sb_bus::publish_json(&*self.bus, DASHBOARD_EVENTS, &event, BTreeMap::new()).await?;
        Ok(())
    }

    /// Settle a `PendingClarification` workflow onto a concrete plan.
    pub async fn replan(&self, workflow_id: WorkflowId, tasks: Vec<TaskBlock>, shared_context: Value) -> Result<(), EngineError> {
        self.store.replan(workflow_id, tasks, shared_context)?;
        let event = DashboardEvent {
            event_type: "WORKFLOW_REPLANNED".to_string(),
            workflow_id: Some(workflow_id),
            task_id: None,
            data: Value::Null,
        };
        sb_bus::publish_json(&*self.bus, DASHBOARD_EVENTS, &event, BTreeMap::new()).await?;
        Ok(())
    }

    async fn publish_status_update(
        &self,
        workflow_id: WorkflowId,
        task_id: TaskId,
        status: BlockStatus,
        result: Option<Value>,
        source: &str,
    ) -> Result<(), EngineError> {
        let message = StatusUpdateMessage {
            workflow_id,
            task_id,
            status: status.to_string(),
            result: result.map(|v| v.render()),
            source: Some(source.to_string()),
        };
        sb_bus::publish_json(&*self.bus, TASK_STATUS_UPDATES, &message, BTreeMap::new()).await?;
        Ok(())
    }

    async fn publish_task_status_dashboard_event(
        &self,
        workflow_id: WorkflowId,
        task_id: TaskId,
        status: BlockStatus,
    ) -> Result<(), EngineError> {
        let event = DashboardEvent {
            event_type: "TASK_STATUS_UPDATE".to_string(),
            workflow_id: Some(workflow_id),
            task_id: Some(task_id),
            data: Value::String(status.to_string()),
        };
        sb_bus::publish_json(&*self.bus, DASHBOARD_EVENTS, &event, BTreeMap::new()).await?;
        Ok(())
    }

    async fn publish_workflow_terminal_dashboard_event(&self, workflow: &Workflow) -> Result<(), EngineError> {
        let event_type = if workflow.status == WorkflowStatus::Completed {
            "WORKFLOW_COMPLETED"
        } else {
            "WORKFLOW_FAILED"
        };
        let event = DashboardEvent {
            event_type: event_type.to_string(),
            workflow_id: Some(workflow.workflow_id),
            task_id: None,
            data: Value::String(workflow.status.to_string()),
        };
        sb_bus::publish_json(&*self.bus, DASHBOARD_EVENTS, &event, BTreeMap::new()).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "workflow_manager_tests.rs"]
mod tests;
