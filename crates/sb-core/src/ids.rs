// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strongly typed identifiers used across the orchestrator.

crate::define_id! {
    /// Identifies a durable workflow record.
    pub struct WorkflowId("wfl-");
}

crate::define_id! {
    /// Identifies a single block within a workflow's task tree.
    pub struct TaskId("tsk-");
}

crate::define_id! {
    /// Identifies a registered agent process.
    pub struct AgentId("agt-");
}

crate::define_id! {
    /// Identifies a persistent goal.
    pub struct GoalId("gol-");
}

crate::define_id! {
    /// Identifies an external platform event that triggered a workflow.
    pub struct EventId("evt-");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        let id = WorkflowId::new();
        let parsed = WorkflowId::from_string(id.as_str());
        assert_eq!(id, parsed);
        assert!(id.as_str().starts_with("wfl-"));
    }

    #[test]
    fn suffix_strips_prefix() {
        let id = TaskId::from_string("tsk-abc123");
        assert_eq!(id.suffix(), "abc123");
    }
}
