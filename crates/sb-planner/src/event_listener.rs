// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Listener: consumes the external platform-events topic. Anomaly
//! events with a well-known shape instantiate a static, pre-authored
//! workflow template directly; every other anomaly hands off to the
//! Planner for a fresh investigation workflow. Model-feedback events are
//! forwarded to the dashboard as-is.

use crate::insights::InsightStore;
use crate::llm::LlmGateway;
use crate::planner::{GeneratedWorkflow, Planner, PlanOutcome};
use crate::templates;
use sb_bus::{BusError, MessageBus, SubscriptionType};
use sb_core::{Clock, EventId, Value};
use sb_engine::Executor;
use sb_wire::{DashboardEvent, DASHBOARD_EVENTS, PLATFORM_EVENTS};
use serde::Deserialize;
use std::sync::Arc;

const ANOMALY_ERROR_RATE: &str = "anomaly.detected.error_rate";
const MODEL_FEEDBACK_RECEIVED: &str = "MODEL_FEEDBACK_RECEIVED";

#[derive(Debug, Deserialize)]
struct PlatformEvent {
    event_type: String,
    #[serde(default)]
    event_id: Option<EventId>,
    #[serde(default)]
    data: Value,
}

pub async fn run_platform_event_listener<C, G, I>(
    bus: Arc<dyn MessageBus>,
    executor: Arc<Executor<C>>,
    planner: Arc<Planner<G, I>>,
) -> Result<(), BusError>
where
    C: Clock + 'static,
    G: LlmGateway,
    I: InsightStore,
{
    let mut consumer = bus.subscribe(PLATFORM_EVENTS, "event-listener", SubscriptionType::Shared).await?;

    loop {
        let message = consumer.receive().await?;
        let event = match message.parse_json::<PlatformEvent>() {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse platform event, requesting redelivery");
                consumer.nack(&message).await?;
                continue;
            }
        };

        handle(&bus, &executor, &planner, event).await;
        consumer.ack(&message).await?;
    }
}

async fn handle<C, G, I>(bus: &Arc<dyn MessageBus>, executor: &Arc<Executor<C>>, planner: &Arc<Planner<G, I>>, event: PlatformEvent)
where
    C: Clock + 'static,
    G: LlmGateway,
    I: InsightStore,
{
    match event.event_type.as_str() {
        ANOMALY_ERROR_RATE | templates::ANOMALY_DISK_FULL => {
            broadcast_anomaly(bus, &event).await;
            investigate(executor, planner, event).await;
        }
        MODEL_FEEDBACK_RECEIVED => {
            broadcast_anomaly(bus, &event).await;
        }
        other => {
            tracing::debug!(event_type = other, "ignoring unrecognized platform event");
        }
    }
}

async fn broadcast_anomaly(bus: &Arc<dyn MessageBus>, event: &PlatformEvent) {
    let dashboard_event = DashboardEvent {
        event_type: event.event_type.clone(),
        workflow_id: None,
        task_id: None,
        data: event.data.clone(),
    };
    if let Err(err) = sb_bus::publish_json(&**bus, DASHBOARD_EVENTS, &dashboard_event, Default::default()).await {
        tracing::warn!(error = %err, "failed to broadcast platform event to the dashboard");
    }
}

async fn investigate<C, G, I>(executor: &Arc<Executor<C>>, planner: &Arc<Planner<G, I>>, event: PlatformEvent)
where
    C: Clock + 'static,
    G: LlmGateway,
    I: InsightStore,
{
    if let Some(event_id) = event.event_id {
        if executor.manager().get_by_event_id(event_id).is_some() {
            tracing::debug!(%event_id, "investigation workflow already exists for this event, skipping");
            return;
        }
    }

    let generated = match templates::instantiate(&event.event_type, &event.data) {
        Some(Ok(generated)) => generated,
        Some(Err(err)) => {
            tracing::warn!(error = %err, event_type = %event.event_type, "failed to instantiate templated workflow, falling back to the planner");
            match plan_investigation(planner, &event).await {
                Some(generated) => generated,
                None => return,
            }
        }
        None => match plan_investigation(planner, &event).await {
            Some(generated) => generated,
            None => return,
        },
    };

    let workflow = generated.into_workflow(sb_core::WorkflowId::new(), 0, event.event_id);
    let workflow_id = workflow.workflow_id;
    if let Err(err) = executor.manager().create(workflow) {
        tracing::warn!(error = %err, "failed to store the investigation workflow");
        return;
    }
    if let Err(err) = executor.advance(workflow_id).await {
        tracing::warn!(error = %err, %workflow_id, "failed to dispatch the investigation workflow's first task");
    }
}

async fn plan_investigation<G, I>(planner: &Planner<G, I>, event: &PlatformEvent) -> Option<GeneratedWorkflow>
where
    G: LlmGateway,
    I: InsightStore,
{
    let prompt = format!(
        "An anomaly was detected: {}. Investigate the root cause and propose a fix.",
        event.data.render()
    );
    let outcome = match planner.plan(&prompt).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, "failed to plan an investigation for the detected anomaly");
            return None;
        }
    };

    match outcome {
        PlanOutcome::Workflow(generated) => Some(generated),
        PlanOutcome::NeedsClarification { question } => {
            tracing::warn!(%question, "anomaly investigation planning came back ambiguous, dropping");
            None
        }
    }
}

#[cfg(test)]
#[path = "event_listener_tests.rs"]
mod tests;
