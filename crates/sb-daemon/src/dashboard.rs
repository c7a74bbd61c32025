// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard Broadcaster: forwards every `DashboardEvent` published on the
//! bus to every connected WebSocket client. Subscriptions are exclusive per
//! observer rather than filtered by channel, so a client sees the full
//! stream -- there is no per-client subscribe/unsubscribe protocol.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use sb_bus::{MessageBus, SubscriptionType};
use sb_wire::DashboardEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shared fan-out point: one bus consumer feeds a broadcast channel, every
/// WebSocket connection gets its own receiver off of it.
#[derive(Clone)]
pub struct DashboardBroadcaster {
    sender: broadcast::Sender<DashboardEvent>,
}

impl DashboardBroadcaster {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }
}

impl Default for DashboardBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume `sb_wire::DASHBOARD_EVENTS` forever, republishing each message
/// into the in-process broadcast channel. One exclusive subscription per
/// process: every dashboard observer rides the same feed.
pub async fn run_dashboard_broadcaster(
    bus: Arc<dyn MessageBus>,
    broadcaster: DashboardBroadcaster,
) -> Result<(), sb_bus::BusError> {
    let mut consumer = bus
        .subscribe(sb_wire::DASHBOARD_EVENTS, "dashboard-broadcaster", SubscriptionType::Exclusive)
        .await?;
    loop {
        let message = consumer.receive().await?;
        match message.parse_json::<DashboardEvent>() {
            Ok(event) => {
                // No receivers connected is not an error: the event is
                // simply dropped, matching a dashboard with nobody watching.
                let _ = broadcaster.sender.send(event);
            }
            Err(err) => tracing::warn!(error = %err, "dropping unparseable dashboard event"),
        }
        consumer.ack(&message).await?;
    }
}

pub async fn dashboard_ws_handler(ws: WebSocketUpgrade, State(broadcaster): State<DashboardBroadcaster>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(mut socket: WebSocket, broadcaster: DashboardBroadcaster) {
    let mut receiver = broadcaster.subscribe();
    loop {
        tokio::select! {
            event = receiver.recv() => {
                match event {
                    Ok(event) => {
                        let payload = match serde_json::to_string(&event) {
                            Ok(payload) => payload,
                            Err(err) => {
                                tracing::warn!(error = %err, "failed to serialize dashboard event");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "dashboard client lagged, skipping ahead");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => break,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
