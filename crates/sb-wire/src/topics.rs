// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known topic names and the dead-letter naming convention.

use sb_core::AgentId;

pub const REGISTRATIONS: &str = "registrations";
pub const RESULTS: &str = "results";
pub const TASK_STATUS_UPDATES: &str = "task_status_updates";
pub const CONDITIONAL_EVALUATIONS: &str = "conditional_evaluations";
pub const DASHBOARD_EVENTS: &str = "dashboard_events";
pub const PLATFORM_EVENTS: &str = "platform_events";

/// Per-agent inbox topic: `agent_task.<agent_id>`.
pub fn agent_task_topic(agent_id: AgentId) -> String {
    format!("agent_task.{agent_id}")
}

/// Dead-letter topic for a given source topic: `<topic>.DLQ`.
pub fn dead_letter_topic(topic: &str) -> String {
    format!("{topic}.DLQ")
}
