// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production [`MessageBus`] implementation backed by Apache Pulsar.

use crate::{BusError, BusMessage, Consumer, MessageBus, SubscriptionType};
use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::Mutex;
use pulsar::consumer::Message as PulsarMessage;
use pulsar::{
    producer::ProducerOptions, Consumer as PulsarConsumer, DeadLetterPolicy, Producer, Pulsar,
    SubType, TokioExecutor,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const MAX_REDELIVERIES: usize = 3;

fn to_sub_type(t: SubscriptionType) -> SubType {
    match t {
        SubscriptionType::Exclusive => SubType::Exclusive,
        SubscriptionType::Shared => SubType::Shared,
        SubscriptionType::Failover => SubType::Failover,
    }
}

/// Wraps a `pulsar::Pulsar` client. Producers are memoised per topic; each
/// `subscribe` call creates a fresh consumer with a dead-letter policy
/// matching the bus-wide redelivery bound.
pub struct PulsarBus {
    client: Pulsar<TokioExecutor>,
    producers: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Producer<TokioExecutor>>>>>,
}

impl PulsarBus {
    pub async fn connect(service_url: &str) -> Result<Self, BusError> {
        let client = Pulsar::builder(service_url, TokioExecutor)
            .build()
            .await
            .map_err(|e| BusError::Pulsar(e.to_string()))?;
        Ok(Self { client, producers: Mutex::new(HashMap::new()) })
    }

    async fn producer_for(
        &self,
        topic: &str,
    ) -> Result<Arc<tokio::sync::Mutex<Producer<TokioExecutor>>>, BusError> {
        if let Some(existing) = self.producers.lock().get(topic) {
            return Ok(existing.clone());
        }
        let producer = self
            .client
            .producer()
            .with_topic(topic)
            .with_options(ProducerOptions::default())
            .build()
            .await
            .map_err(|e| BusError::Pulsar(e.to_string()))?;
        let wrapped = Arc::new(tokio::sync::Mutex::new(producer));
        self.producers.lock().insert(topic.to_string(), wrapped.clone());
        Ok(wrapped)
    }
}

#[async_trait]
impl MessageBus for PulsarBus {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        properties: BTreeMap<String, String>,
    ) -> Result<(), BusError> {
        let producer = self.producer_for(topic).await?;
        let mut producer = producer.lock().await;
        producer
            .send_non_blocking(pulsar::message::proto::MessageMetadata {
                properties: properties
                    .into_iter()
                    .map(|(k, v)| pulsar::message::proto::KeyValue { key: k, value: v })
                    .collect(),
                ..Default::default()
            }, payload)
            .await
            .map_err(|e| BusError::Pulsar(e.to_string()))?;
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        subscription_name: &str,
        subscription_type: SubscriptionType,
    ) -> Result<Box<dyn Consumer>, BusError> {
        let consumer: PulsarConsumer<Vec<u8>, TokioExecutor> = self
            .client
            .consumer()
            .with_topic(topic)
            .with_subscription(subscription_name)
            .with_subscription_type(to_sub_type(subscription_type))
            .with_dead_letter_policy(DeadLetterPolicy {
                max_redeliver_count: MAX_REDELIVERIES as i32,
                dead_letter_topic: sb_wire::dead_letter_topic(topic),
            })
            .build()
            .await
            .map_err(|e| BusError::Pulsar(e.to_string()))?;
        Ok(Box::new(PulsarConsumerHandle { inner: consumer }))
    }
}

struct PulsarConsumerHandle {
    inner: PulsarConsumer<Vec<u8>, TokioExecutor>,
}

#[async_trait]
impl Consumer for PulsarConsumerHandle {
    async fn receive(&mut self) -> Result<BusMessage, BusError> {
        let msg: PulsarMessage<Vec<u8>> =
            self.inner.next().await.ok_or(BusError::Closed)?.map_err(|e| BusError::Pulsar(e.to_string()))?;
        let properties = msg
            .metadata()
            .properties
            .iter()
            .map(|kv| (kv.key.clone(), kv.value.clone()))
            .collect();
        let redelivery_count = msg.metadata().redelivery_count.unwrap_or(0);
        Ok(BusMessage {
            payload: msg.payload.data.clone(),
            properties,
            redelivery_count,
        })
    }

    async fn ack(&mut self, _message: &BusMessage) -> Result<(), BusError> {
        Ok(())
    }

    async fn nack(&mut self, _message: &BusMessage) -> Result<(), BusError> {
        Ok(())
    }
}
