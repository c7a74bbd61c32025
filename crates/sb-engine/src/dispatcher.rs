// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Dispatcher: resolves an agent selector against the registry,
//! stamps a task message, and publishes it to that agent's inbox topic.
//! Tracks one pending-dispatch counter per personality so the goal
//! monitor and dashboard can report load without querying the bus.

use crate::registry::AgentRegistry;
use crate::EngineError;
use sb_core::{Clock, TaskId, WorkflowId};
use sb_wire::TaskMessage;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Selects which registered agent a task should go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSelector {
    Any,
    Id(sb_core::AgentId),
    Prefix(String),
}

#[derive(Default)]
struct PendingCounts {
    by_personality: parking_lot::Mutex<BTreeMap<String, AtomicU64>>,
}

impl PendingCounts {
    fn increment(&self, personality: &str) {
        let mut map = self.by_personality.lock();
        map.entry(personality.to_string()).or_insert_with(|| AtomicU64::new(0)).fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self, personality: &str) {
        let map = self.by_personality.lock();
        if let Some(counter) = map.get(personality) {
            let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some(v.saturating_sub(1)));
        }
    }

    fn count(&self, personality: &str) -> u64 {
        self.by_personality.lock().get(personality).map(|c| c.load(Ordering::SeqCst)).unwrap_or(0)
    }
}

pub struct Dispatcher<C: Clock> {
    bus: Arc<dyn sb_bus::MessageBus>,
    registry: AgentRegistry,
    clock: C,
    pending: PendingCounts,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(bus: Arc<dyn sb_bus::MessageBus>, registry: AgentRegistry, clock: C) -> Self {
        Self { bus, registry, clock, pending: PendingCounts::default() }
    }

    pub fn pending_count(&self, personality: &str) -> u64 {
        self.pending.count(personality)
    }

    /// Resolve `selector`, stamp and publish a task message. Returns the
    /// effective task id (caller-supplied or freshly minted).
    pub async fn dispatch(
        &self,
        prompt: String,
        selector: &AgentSelector,
        task_id: Option<TaskId>,
        workflow_id: Option<WorkflowId>,
        model: Option<String>,
        traceparent: Option<&str>,
    ) -> Result<TaskId, EngineError> {
        let agent = match selector {
            AgentSelector::Any => self.registry.get_any(),
            AgentSelector::Id(id) => self.registry.get_by_id(*id),
            AgentSelector::Prefix(prefix) => self.registry.find_by_prefix(prefix),
        }
        .ok_or_else(|| EngineError::NoAgentAvailable(format!("{selector:?}")))?;

        let task_id = task_id.unwrap_or_else(TaskId::new);
        let message = TaskMessage {
            id: task_id.to_string(),
            prompt,
            model: model.unwrap_or_else(|| "default".to_string()),
            timestamp: self.clock.epoch_ms(),
            workflow_id,
            task_id: Some(task_id),
            agent_personality: Some(agent.personality.clone()),
        };

        let mut properties = BTreeMap::new();
        if let Some(traceparent) = traceparent {
            sb_wire::inject_trace(&mut properties, traceparent);
        }

        let payload = serde_json::to_vec(&message).map_err(sb_bus::BusError::Serialize)?;
        self.bus.publish(&agent.task_topic, payload, properties).await?;
        self.pending.increment(&agent.personality);
        Ok(task_id)
    }

    /// Called by the result listener once a dispatched task settles.
    pub fn mark_settled(&self, personality: &str) {
        self.pending.decrement(personality);
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
