// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Goal Monitor: a periodic background loop that watches each active
//! goal's conditions against live and forecasted metrics, and triggers
//! remediation the moment either source crosses a threshold.

use crate::insights::InsightStore;
use crate::llm::LlmGateway;
use crate::metrics::{ForecastSource, MetricsSource};
use crate::planner::{Planner, PlanOutcome};
use sb_core::{Clock, Goal, WorkflowStatus};
use sb_engine::Executor;
use sb_storage::GoalStore;
use std::sync::Arc;
use std::time::Duration;

/// Run the monitor loop forever, ticking every `interval`. Each tick is
/// best-effort: a failure to produce a remediation plan for one goal is
/// logged and does not block the remaining goals, nor is it retried until
/// the next tick.
pub async fn run_goal_monitor<C, G, I>(
    goals: GoalStore,
    executor: Arc<Executor<C>>,
    planner: Arc<Planner<G, I>>,
    metrics: Arc<dyn MetricsSource>,
    forecast: Arc<dyn ForecastSource>,
    interval: Duration,
) where
    C: Clock + 'static,
    G: LlmGateway,
    I: InsightStore,
{
    loop {
        tokio::time::sleep(interval).await;
        for goal in goals.list_active() {
            tick_goal(&goal, &executor, &planner, &*metrics, &*forecast).await;
        }
    }
}

async fn tick_goal<C, G, I>(
    goal: &Goal,
    executor: &Arc<Executor<C>>,
    planner: &Arc<Planner<G, I>>,
    metrics: &dyn MetricsSource,
    forecast: &dyn ForecastSource,
) where
    C: Clock + 'static,
    G: LlmGateway,
    I: InsightStore,
{
    for condition in &goal.conditions {
        match metrics.current(&condition.service, &condition.metric).await {
            Ok(Some(value)) if condition.operator.evaluate(value, condition.value) => {
                remediate(goal, executor, planner, false).await;
                return;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, goal_id = %goal.goal_id, "failed to read current metric, trying forecast");
            }
        }

        match forecast.forecast(&condition.service, &condition.metric).await {
            Ok(points) if points.iter().any(|(_, value)| condition.operator.evaluate(*value, condition.value)) => {
                remediate(goal, executor, planner, true).await;
                return;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, goal_id = %goal.goal_id, "failed to read forecast");
            }
        }
    }
}

async fn remediate<C, G, I>(goal: &Goal, executor: &Arc<Executor<C>>, planner: &Arc<Planner<G, I>>, predicted: bool)
where
    C: Clock + 'static,
    G: LlmGateway,
    I: InsightStore,
{
    tracing::info!(goal_id = %goal.goal_id, predicted, "goal condition breached, triggering remediation");

    if let Some(workflow_id) = goal.remediation_workflow_id {
        if let Err(err) = executor.manager().update_workflow_status(workflow_id, WorkflowStatus::Running).await {
            tracing::warn!(error = %err, %workflow_id, "failed to re-run the pre-built remediation workflow");
            return;
        }
        if let Err(err) = executor.advance(workflow_id).await {
            tracing::warn!(error = %err, %workflow_id, "failed to advance remediation workflow after re-run");
        }
        return;
    }

    let prompt = format!(
        "The goal \"{}\" is breaching its condition for service. Synthesize and execute a remediation plan.",
        goal.objective
    );
    let outcome = match planner.plan(&prompt).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, goal_id = %goal.goal_id, "failed to produce a remediation plan");
            return;
        }
    };

    let generated = match outcome {
        PlanOutcome::Workflow(generated) => generated,
        PlanOutcome::NeedsClarification { question } => {
            tracing::warn!(goal_id = %goal.goal_id, %question, "remediation planning came back ambiguous, dropping this tick");
            return;
        }
    };

    let workflow = generated.into_workflow(sb_core::WorkflowId::new(), 0, None);
    let workflow_id = workflow.workflow_id;
    if let Err(err) = executor.manager().create(workflow) {
        tracing::warn!(error = %err, goal_id = %goal.goal_id, "failed to store synthesized remediation workflow");
        return;
    }
    if let Err(err) = executor.advance(workflow_id).await {
        tracing::warn!(error = %err, %workflow_id, "failed to dispatch the first task of the remediation workflow");
    }
}

#[cfg(test)]
#[path = "goal_monitor_tests.rs"]
mod tests;
