// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

/// Mirrors Pulsar's three subscription modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionType {
    /// Exactly one active consumer across the whole subscription; used for
    /// the agent registry (single owner of the live-agent table) and each
    /// dashboard observer's own private feed.
    Exclusive,
    /// Competing consumers, messages load-balanced across replicas; used
    /// for results, status updates, and conditional evaluations.
    Shared,
    /// Competing consumers with automatic failover to a backup on the
    /// active consumer's disconnect; currently unused by any in-process
    /// consumer but exposed for parity with the bus this models.
    Failover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    pub payload: Vec<u8>,
    pub properties: BTreeMap<String, String>,
    pub redelivery_count: u32,
}

impl BusMessage {
    pub fn new(payload: Vec<u8>, properties: BTreeMap<String, String>) -> Self {
        Self { payload, properties, redelivery_count: 0 }
    }

    pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::BusError> {
        serde_json::from_slice(&self.payload).map_err(crate::BusError::Deserialize)
    }
}
