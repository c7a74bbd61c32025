// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("no such topic: {0}")]
    UnknownTopic(String),
    #[error("consumer channel closed")]
    Closed,
    #[error("failed to serialize message: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to deserialize message: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("pulsar error: {0}")]
    Pulsar(String),
}
