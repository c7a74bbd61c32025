// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes exchanged over the message bus and the HTTP API: task,
//! result and status-update messages, topic naming, trace-context
//! propagation, and the HTTP request/response DTOs.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod api;
mod messages;
mod topics;
mod trace;

pub use api::{
    ApproveTaskRequest, ClarifyRequest, CreateGoalRequest, DashboardEvent, SubmitTaskRequest,
    SubmitTaskResponse,
};
pub use messages::{
    ConditionalEvalMessage, RegistrationMessage, ResultMessage, StatusUpdateMessage, TaskMessage,
    UnregistrationMessage,
};
pub use topics::{
    agent_task_topic, dead_letter_topic, CONDITIONAL_EVALUATIONS, DASHBOARD_EVENTS,
    PLATFORM_EVENTS, REGISTRATIONS, RESULTS, TASK_STATUS_UPDATES,
};
pub use trace::{extract as extract_trace, inject as inject_trace, TRACEPARENT_KEY};