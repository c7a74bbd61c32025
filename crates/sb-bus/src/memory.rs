// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory bus used by tests and by the black-box integration suite.
//! Implements the same redelivery/dead-letter contract as the Pulsar
//! backend so executor and listener logic can be exercised without a
//! broker.

use crate::{BusError, BusMessage, Consumer, MessageBus, SubscriptionType};
use async_trait::async_trait;
use parking_lot::Mutex;
use sb_wire::dead_letter_topic;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;

const MAX_REDELIVERIES: u32 = 3;

struct Topic {
    tx: mpsc::UnboundedSender<BusMessage>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<BusMessage>>>,
    exclusive_taken: bool,
}

#[derive(Default)]
pub struct InMemoryBus {
    topics: Mutex<HashMap<String, Topic>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn topic_entry_tx(&self, topic: &str) -> mpsc::UnboundedSender<BusMessage> {
        let mut topics = self.topics.lock();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                Topic { tx, rx: Arc::new(Mutex::new(rx)), exclusive_taken: false }
            })
            .tx
            .clone()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        properties: BTreeMap<String, String>,
    ) -> Result<(), BusError> {
        let tx = self.topic_entry_tx(topic);
        tx.send(BusMessage::new(payload, properties)).map_err(|_| BusError::Closed)
    }

    async fn subscribe(
        &self,
        topic: &str,
        _subscription_name: &str,
        subscription_type: SubscriptionType,
    ) -> Result<Box<dyn Consumer>, BusError> {
        let (tx, rx) = {
            let mut topics = self.topics.lock();
            let entry = topics.entry(topic.to_string()).or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                Topic { tx, rx: Arc::new(Mutex::new(rx)), exclusive_taken: false }
            });
            if subscription_type == SubscriptionType::Exclusive {
                if entry.exclusive_taken {
                    return Err(BusError::Pulsar(format!(
                        "topic {topic} already has an exclusive consumer"
                    )));
                }
                entry.exclusive_taken = true;
            }
            (entry.tx.clone(), entry.rx.clone())
        };
        Ok(Box::new(InMemoryConsumer {
            topic: topic.to_string(),
            tx,
            rx,
            dlq_tx: self.topic_entry_tx(&dead_letter_topic(topic)),
        }))
    }
}

struct InMemoryConsumer {
    topic: String,
    /// Sender for this consumer's own topic, used to requeue on `nack`.
    tx: mpsc::UnboundedSender<BusMessage>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<BusMessage>>>,
    dlq_tx: mpsc::UnboundedSender<BusMessage>,
}

#[async_trait]
impl Consumer for InMemoryConsumer {
    async fn receive(&mut self) -> Result<BusMessage, BusError> {
        loop {
            let received = {
                let mut rx = self.rx.lock();
                rx.try_recv()
            };
            match received {
                Ok(msg) => return Ok(msg),
                Err(mpsc::error::TryRecvError::Empty) => {
                    tokio::task::yield_now().await;
                }
                Err(mpsc::error::TryRecvError::Disconnected) => return Err(BusError::Closed),
            }
        }
    }

    async fn ack(&mut self, _message: &BusMessage) -> Result<(), BusError> {
        Ok(())
    }

    async fn nack(&mut self, message: &BusMessage) -> Result<(), BusError> {
        let mut redelivered = message.clone();
        redelivered.redelivery_count += 1;
        if redelivered.redelivery_count > MAX_REDELIVERIES {
            tracing::warn!(topic = %self.topic, "message exceeded redelivery bound, dead-lettering");
            self.dlq_tx.send(redelivered).map_err(|_| BusError::Closed)
        } else {
            // Redeliver by re-publishing to the same topic's queue so the
            // next `receive()` (by this or a competing consumer) picks it up.
            self.tx.send(redelivered).map_err(|_| BusError::Closed)
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
