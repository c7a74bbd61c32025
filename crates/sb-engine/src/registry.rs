// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Registry: tracks which agents are live and what they can do.
//! A single failover consumer on the registrations topic keeps the table
//! current; lookups are read-only and lock-free beyond the reader-writer
//! guard on the table itself.

use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use sb_bus::{BusError, MessageBus, SubscriptionType};
use sb_core::{AgentId, AgentRegistration};
use sb_wire::{RegistrationMessage, UnregistrationMessage, REGISTRATIONS};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct Table {
    agents: BTreeMap<AgentId, AgentRegistration>,
}

/// Shared, cheaply-cloned handle onto the live agent table.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    table: Arc<RwLock<Table>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registration: AgentRegistration) {
        self.table.write().agents.insert(registration.agent_id, registration);
    }

    pub fn unregister(&self, agent_id: AgentId) {
        self.table.write().agents.remove(&agent_id);
    }

    /// A uniformly-chosen live agent, or `None` if the table is empty.
    pub fn get_any(&self) -> Option<AgentRegistration> {
        let table = self.table.read();
        table.agents.values().choose(&mut rand::thread_rng()).cloned()
    }

    pub fn get_by_id(&self, agent_id: AgentId) -> Option<AgentRegistration> {
        self.table.read().agents.get(&agent_id).cloned()
    }

    /// First agent (by id order) whose id or personality starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<AgentRegistration> {
        self.table.read().agents.values().find(|reg| reg.matches_prefix(prefix)).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.read().agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run the registration consumer loop until the bus closes. Malformed
/// registration/unregistration payloads are acknowledged and dropped with a
/// warning rather than negative-acked, since retrying a parse failure never
/// succeeds.
pub async fn run_registration_consumer(bus: Arc<dyn MessageBus>, registry: AgentRegistry) -> Result<(), BusError> {
    let mut consumer = bus.subscribe(REGISTRATIONS, "agent-registry", SubscriptionType::Failover).await?;

    loop {
        let message = consumer.receive().await?;
        if let Ok(unregistration) = message.parse_json::<UnregistrationMessage>() {
            registry.unregister(unregistration.agent_id);
            consumer.ack(&message).await?;
            continue;
        }
        match message.parse_json::<RegistrationMessage>() {
            Ok(registration) => {
                registry.register(AgentRegistration {
                    agent_id: registration.agent_id,
                    task_topic: registration.task_topic,
                    personality: registration.personality,
                });
                consumer.ack(&message).await?;
            }
            Err(err) => {
                tracing::warn!(error = %err, "dropping unparsable registration message");
                consumer.ack(&message).await?;
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
