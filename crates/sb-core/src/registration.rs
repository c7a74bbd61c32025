// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral agent registration records held by the agent registry.

use crate::ids::AgentId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub agent_id: AgentId,
    pub task_topic: String,
    pub personality: String,
}

impl AgentRegistration {
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.agent_id.as_str().starts_with(prefix) || self.personality.starts_with(prefix)
    }
}
