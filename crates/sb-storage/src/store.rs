// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public durable-state API. Wraps the write-ahead log and the in-memory
//! materialized state behind a single lock per store, so every mutation is
//! append-then-apply under one critical section: the WAL entry for a
//! change is always durable before the in-memory view reflects it.

use crate::error::StoreError;
use crate::event::Event;
use crate::migration::MigrationRegistry;
use crate::snapshot;
use crate::state::MaterializedState;
use crate::wal::Wal;
use parking_lot::Mutex;
use sb_core::{BlockStatus, Goal, GoalId, TaskBlock, TaskId, Value, Workflow, WorkflowId, WorkflowStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct Durable {
    wal: Wal,
    snapshot_path: PathBuf,
    state: MaterializedState,
}

/// Shared handle over the durable event log and materialized state. Clone
/// is cheap (an `Arc` bump); all clones observe the same underlying store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Durable>>,
}

impl Store {
    /// Open (or create) the store rooted at `dir`, replaying the WAL on top
    /// of the most recent snapshot to rebuild materialized state.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(crate::error::WalError::from)?;
        let snapshot_path = dir.join("state.snap");
        let wal_path = dir.join("events.wal");

        let registry = MigrationRegistry::new();
        let (mut state, start_seq) = match snapshot::read_snapshot(&snapshot_path, &registry)? {
            Some((seq, value)) => {
                let materialized: MaterializedStateSnapshot = serde_json::from_value(value)
                    .map_err(crate::error::WalError::from)?;
                (materialized.into_state(), seq)
            }
            None => (MaterializedState::new(), 0),
        };

        let mut wal = Wal::open(&wal_path, start_seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(Durable { wal, snapshot_path, state })),
        })
    }

    /// Write a fresh snapshot of the current materialized state and
    /// compact the WAL up to the sequence it captures.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let seq = guard.wal.processed_seq();
        let snapshot = MaterializedStateSnapshot::from_state(&guard.state);
        snapshot::write_snapshot(guard.snapshot_path.clone(), seq, &snapshot)?;
        guard.wal.compact(seq)?;
        Ok(())
    }

    pub fn workflows(&self) -> WorkflowStore {
        WorkflowStore { inner: self.inner.clone() }
    }

    pub fn goals(&self) -> GoalStore {
        GoalStore { inner: self.inner.clone() }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct MaterializedStateSnapshot {
    workflows: std::collections::BTreeMap<WorkflowId, Workflow>,
    goals: std::collections::BTreeMap<GoalId, Goal>,
    agents: std::collections::BTreeMap<sb_core::AgentId, sb_core::AgentRegistration>,
}

impl MaterializedStateSnapshot {
    fn from_state(state: &MaterializedState) -> Self {
        Self {
            workflows: state.workflows.clone(),
            goals: state.goals.clone(),
            agents: state.agents.clone(),
        }
    }

    fn into_state(self) -> MaterializedState {
        MaterializedState {
            workflows: self.workflows,
            goals: self.goals,
            agents: self.agents,
        }
    }
}

/// Workflow-scoped view over the shared store.
#[derive(Clone)]
pub struct WorkflowStore {
    inner: Arc<Mutex<Durable>>,
}

impl WorkflowStore {
    pub fn create(&self, workflow: Workflow) -> Result<(), StoreError> {
        {
            let guard = self.inner.lock();
            if guard.state.workflows.contains_key(&workflow.workflow_id) {
                return Err(StoreError::WorkflowAlreadyExists(workflow.workflow_id));
            }
        }
        self.append(Event::WorkflowCreated { workflow })
    }

    pub fn get(&self, workflow_id: WorkflowId) -> Result<Workflow, StoreError> {
        self.inner
            .lock()
            .state
            .workflows
            .get(&workflow_id)
            .cloned()
            .ok_or(StoreError::WorkflowNotFound(workflow_id))
    }

    pub fn get_by_event_id(&self, event_id: sb_core::EventId) -> Option<Workflow> {
        self.inner
            .lock()
            .state
            .workflows
            .values()
            .find(|w| w.event_id == Some(event_id))
            .cloned()
    }

    pub fn list_running(&self) -> Vec<Workflow> {
        self.inner
            .lock()
            .state
            .workflows
            .values()
            .filter(|w| !w.status.is_terminal())
            .cloned()
            .collect()
    }

    /// Apply a status transition to a single task block, enforcing the
    /// legal-transition matrix before it is durably recorded.
    pub fn update_task_status(
        &self,
        workflow_id: WorkflowId,
        task_id: TaskId,
        status: BlockStatus,
        result: Option<Value>,
        context_updates: Option<Value>,
    ) -> Result<(), StoreError> {
        {
            let guard = self.inner.lock();
            let workflow = guard
                .state
                .workflows
                .get(&workflow_id)
                .ok_or(StoreError::WorkflowNotFound(workflow_id))?;
            let block = workflow.blocks().get(&task_id).copied().ok_or(StoreError::BlockNotFound(task_id))?;
            let from = block.status();
            if !from.can_transition_to(status) {
                return Err(StoreError::IllegalTransition { task_id, from, to: status });
            }
        }
        self.append(Event::TaskStatusChanged { workflow_id, task_id, status, result, context_updates })
    }

    pub fn update_workflow_status(&self, workflow_id: WorkflowId, status: WorkflowStatus) -> Result<(), StoreError> {
        {
            let guard = self.inner.lock();
            if !guard.state.workflows.contains_key(&workflow_id) {
                return Err(StoreError::WorkflowNotFound(workflow_id));
            }
        }
        self.append(Event::WorkflowStatusChanged { workflow_id, status })
    }

    /// Deep-merge `context_updates` into the workflow's `shared_context`.
    pub fn merge_context(&self, workflow_id: WorkflowId, context_updates: Value) -> Result<(), StoreError> {
        {
            let guard = self.inner.lock();
            if !guard.state.workflows.contains_key(&workflow_id) {
                return Err(StoreError::WorkflowNotFound(workflow_id));
            }
        }
        self.append(Event::WorkflowContextMerged { workflow_id, context_updates })
    }

    /// Settle a `PendingClarification` workflow onto a concrete plan,
    /// replacing its (empty) task list and moving it to `Running`.
    pub fn replan(&self, workflow_id: WorkflowId, tasks: Vec<TaskBlock>, shared_context: Value) -> Result<(), StoreError> {
        {
            let guard = self.inner.lock();
            let workflow = guard.state.workflows.get(&workflow_id).ok_or(StoreError::WorkflowNotFound(workflow_id))?;
            if workflow.status != WorkflowStatus::PendingClarification {
                return Err(StoreError::NotPendingClarification(workflow_id));
            }
        }
        self.append(Event::WorkflowReplanned { workflow_id, tasks, shared_context })
    }

    fn append(&self, event: Event) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let seq = guard.wal.append(&event)?;
        guard.wal.flush()?;
        guard.state.apply_event(&event);
        guard.wal.mark_processed(seq);
        Ok(())
    }
}

/// Goal-scoped view over the shared store.
#[derive(Clone)]
pub struct GoalStore {
    inner: Arc<Mutex<Durable>>,
}

impl GoalStore {
    pub fn create(&self, goal: Goal) -> Result<(), StoreError> {
        self.append(Event::GoalCreated { goal })
    }

    pub fn get(&self, goal_id: GoalId) -> Result<Goal, StoreError> {
        self.inner.lock().state.goals.get(&goal_id).cloned().ok_or(StoreError::GoalNotFound(goal_id))
    }

    pub fn update(&self, goal: Goal) -> Result<(), StoreError> {
        {
            let guard = self.inner.lock();
            if !guard.state.goals.contains_key(&goal.goal_id) {
                return Err(StoreError::GoalNotFound(goal.goal_id));
            }
        }
        self.append(Event::GoalUpdated { goal })
    }

    pub fn list_active(&self) -> Vec<Goal> {
        self.inner.lock().state.goals.values().filter(|g| g.is_active).cloned().collect()
    }

    fn append(&self, event: Event) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let seq = guard.wal.append(&event)?;
        guard.wal.flush()?;
        guard.state.apply_event(&event);
        guard.wal.mark_processed(seq);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
