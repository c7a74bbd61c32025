// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory materialized state, rebuilt by replaying the event log and
//! kept current by applying each new event as it is accepted.
//!
//! All event handlers MUST be idempotent: an event may be applied twice,
//! once live (right after being appended) and once more during WAL replay
//! after a crash between the append and the in-memory update. Guidelines:
//! - Use assignment instead of mutation (`set x = v`, not `x += v`).
//! - Guard inserts with existence checks where duplicate application would
//!   otherwise create a second entry.
//! - Guard status transitions so re-applying a terminal transition is a
//!   no-op rather than an error.

mod goals;
mod workflows;

use crate::event::Event;
use sb_core::{AgentId, AgentRegistration, Goal, GoalId, Workflow, WorkflowId};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct MaterializedState {
    pub workflows: BTreeMap<WorkflowId, Workflow>,
    pub goals: BTreeMap<GoalId, Goal>,
    pub agents: BTreeMap<AgentId, AgentRegistration>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::WorkflowCreated { workflow } => workflows::apply_created(self, workflow),
            Event::TaskStatusChanged {
                workflow_id,
                task_id,
                status,
                result,
                context_updates,
            } => workflows::apply_task_status_changed(
                self,
                workflow_id,
                *task_id,
                *status,
                result.clone(),
                context_updates.clone(),
            ),
            Event::WorkflowStatusChanged { workflow_id, status } => {
                workflows::apply_workflow_status_changed(self, workflow_id, *status)
            }
            Event::WorkflowContextMerged { workflow_id, context_updates } => {
                workflows::apply_context_merged(self, workflow_id, context_updates.clone())
            }
            Event::WorkflowReplanned { workflow_id, tasks, shared_context } => {
                workflows::apply_replanned(self, workflow_id, tasks.clone(), shared_context.clone())
            }
            Event::AgentRegistered { registration } => {
                self.agents.insert(registration.agent_id, registration.clone());
            }
            Event::AgentUnregistered { agent_id } => {
                self.agents.remove(agent_id);
            }
            Event::GoalCreated { goal } => goals::apply_created(self, goal),
            Event::GoalUpdated { goal } => goals::apply_updated(self, goal),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
