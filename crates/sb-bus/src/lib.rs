// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Topic-based pub/sub over the message bus: a `MessageBus` trait with an
//! in-memory test double and an Apache Pulsar-backed implementation.
//! Subscriptions follow Pulsar's exclusive/shared/failover semantics, with
//! bounded-redelivery dead-lettering handled uniformly across backends.

mod error;
mod memory;
mod message;
mod pulsar_bus;

pub use error::BusError;
pub use memory::InMemoryBus;
pub use message::{BusMessage, SubscriptionType};
pub use pulsar_bus::PulsarBus;

use async_trait::async_trait;
use std::collections::BTreeMap;

/// A handle to a durable consumer on one topic/subscription pair.
#[async_trait]
pub trait Consumer: Send {
    async fn receive(&mut self) -> Result<BusMessage, BusError>;
    async fn ack(&mut self, message: &BusMessage) -> Result<(), BusError>;
    /// Negative-acknowledge, requesting redelivery. Once a message's
    /// redelivery count exceeds the bus's configured bound it is routed to
    /// the topic's dead-letter topic instead of being redelivered.
    async fn nack(&mut self, message: &BusMessage) -> Result<(), BusError>;
}

/// The bus abstraction every long-running component talks to. Kept narrow so
/// both the in-memory test double and the Pulsar-backed production
/// implementation can satisfy it with no leaky details.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        properties: BTreeMap<String, String>,
    ) -> Result<(), BusError>;

    async fn subscribe(
        &self,
        topic: &str,
        subscription_name: &str,
        subscription_type: SubscriptionType,
    ) -> Result<Box<dyn Consumer>, BusError>;
}

/// Convenience helper for publishing a JSON-serializable payload.
pub async fn publish_json<T: serde::Serialize + Sync>(
    bus: &dyn MessageBus,
    topic: &str,
    value: &T,
    properties: BTreeMap<String, String>,
) -> Result<(), BusError> {
    let payload = serde_json::to_vec(value).map_err(BusError::Serialize)?;
    bus.publish(topic, payload, properties).await
}
