// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent goals evaluated by the goal monitor against live and forecast
//! metrics.

use crate::ids::{GoalId, WorkflowId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl ComparisonOperator {
    pub fn evaluate(self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOperator::Lt => lhs < rhs,
            ComparisonOperator::Gt => lhs > rhs,
            ComparisonOperator::Eq => lhs == rhs,
            ComparisonOperator::Ne => lhs != rhs,
            ComparisonOperator::Le => lhs <= rhs,
            ComparisonOperator::Ge => lhs >= rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCondition {
    pub service: String,
    pub metric: String,
    pub operator: ComparisonOperator,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: GoalId,
    pub objective: String,
    pub is_active: bool,
    pub conditions: Vec<GoalCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_workflow_id: Option<WorkflowId>,
}

crate::builder! {
    pub struct GoalBuilder => Goal {
        computed { goal_id: GoalId = GoalId::new() }
        into { objective: String = "reduce latency" }
        set { is_active: bool = true }
        set { conditions: Vec<GoalCondition> = Vec::new() }
        option { remediation_workflow_id: WorkflowId = None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_evaluates_breach() {
        assert!(ComparisonOperator::Gt.evaluate(0.08, 0.05));
        assert!(!ComparisonOperator::Gt.evaluate(0.02, 0.05));
    }

    #[test]
    fn builder_produces_active_goal_by_default() {
        let goal = Goal::builder().objective("keep auth healthy").build();
        assert!(goal.is_active);
        assert_eq!(goal.objective, "keep auth healthy");
    }
}
