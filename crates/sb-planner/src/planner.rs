// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-phase goal decomposition: analyze the prompt for ambiguity (with
//! retrieved past lessons folded in), then, once clear, generate a
//! structured workflow. Ambiguity is a first-class outcome rather than an
//! error -- see [`PlanOutcome`].

use crate::error::PlannerError;
use crate::insights::InsightStore;
use crate::llm::LlmGateway;
use sb_core::{EventId, TaskBlock, Value, Workflow, WorkflowId, WorkflowStatus};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct PlanAnalysis {
    summary: String,
    is_ambiguous: bool,
    #[serde(default)]
    clarifying_question: Option<String>,
    #[serde(default)]
    high_level_steps: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratedWorkflowWire {
    #[serde(default)]
    shared_context: Value,
    tasks: Vec<TaskBlock>,
}

/// Outcome of the analysis phase: either the prompt needs a follow-up
/// question, or it is clear enough to decompose into a workflow.
#[derive(Debug, Clone)]
enum AnalysisOutcome {
    NeedsClarification { question: String },
    Ready { summary: String, high_level_steps: Vec<String> },
}

/// A workflow freshly produced by the generate phase, not yet assigned an
/// id or durable status. The caller (HTTP handler, goal monitor, event
/// listener) stamps those in before handing it to the Workflow Manager.
#[derive(Debug, Clone)]
pub struct GeneratedWorkflow {
    pub original_prompt: String,
    pub shared_context: Value,
    pub tasks: Vec<TaskBlock>,
}

impl GeneratedWorkflow {
    pub fn into_workflow(self, workflow_id: WorkflowId, created_at: u64, event_id: Option<EventId>) -> Workflow {
        Workflow {
            workflow_id,
            original_prompt: self.original_prompt,
            status: WorkflowStatus::Running,
            shared_context: self.shared_context,
            tasks: self.tasks,
            event_id,
            created_at,
        }
    }
}

/// Outcome of a full `plan`/`replan` call.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    NeedsClarification { question: String },
    Workflow(GeneratedWorkflow),
}

pub struct Planner<G, I> {
    gateway: G,
    insights: I,
    default_model: String,
}

impl<G: LlmGateway, I: InsightStore> Planner<G, I> {
    pub fn new(gateway: G, insights: I, default_model: impl Into<String>) -> Self {
        Self { gateway, insights, default_model: default_model.into() }
    }

    /// Run the full analyze-then-generate pipeline for a fresh user prompt.
    pub async fn plan(&self, prompt: &str) -> Result<PlanOutcome, PlannerError> {
        let lessons = self.retrieve_insights(prompt).await;
        match self.analyze(prompt, &lessons).await? {
            AnalysisOutcome::NeedsClarification { question } => Ok(PlanOutcome::NeedsClarification { question }),
            AnalysisOutcome::Ready { summary, high_level_steps } => {
                let generated = self.generate(prompt, &summary, &high_level_steps).await?;
                Ok(PlanOutcome::Workflow(generated))
            }
        }
    }

    /// Re-run the pipeline with the user's answer folded into the prompt.
    pub async fn replan(&self, original_prompt: &str, clarification: &str) -> Result<PlanOutcome, PlannerError> {
        let combined = format!("{original_prompt}\n\nClarification: {clarification}");
        self.plan(&combined).await
    }

    async fn retrieve_insights(&self, prompt: &str) -> Vec<String> {
        match self.insights.top_insights(prompt, 3).await {
            Ok(lessons) => lessons,
            Err(err) => {
                tracing::warn!(error = %err, "insight retrieval failed, planning without past lessons");
                Vec::new()
            }
        }
    }

    async fn analyze(&self, prompt: &str, lessons: &[String]) -> Result<AnalysisOutcome, PlannerError> {
        let lessons_block = if lessons.is_empty() {
            "No past lessons available.".to_string()
        } else {
            lessons.iter().map(|l| format!("- {l}")).collect::<Vec<_>>().join("\n")
        };
        let request = format!(
            "Analyze this request and respond with ONLY a JSON object matching \
             {{summary, is_ambiguous, clarifying_question, high_level_steps}}.\n\n\
             Past lessons:\n{lessons_block}\n\nRequest: {prompt}"
        );
        let reply = self.gateway.complete(&self.default_model, &request).await?;
        let analysis: PlanAnalysis = serde_json::from_str(strip_code_fence(&reply))?;
        if analysis.is_ambiguous {
            Ok(AnalysisOutcome::NeedsClarification {
                question: analysis
                    .clarifying_question
                    .unwrap_or_else(|| "Could you clarify your request?".to_string()),
            })
        } else {
            Ok(AnalysisOutcome::Ready { summary: analysis.summary, high_level_steps: analysis.high_level_steps })
        }
    }

    async fn generate(&self, original_prompt: &str, summary: &str, steps: &[String]) -> Result<GeneratedWorkflow, PlannerError> {
        let steps_block = steps.iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n");
        let request = format!(
            "Convert this summary and steps into a Workflow JSON object matching \
             {{shared_context, tasks}}, where each task is a tagged TaskBlock \
             (`kind` one of AgentTask, ConditionalBlock, ApprovalBlock). \
             Respond with ONLY the JSON object.\n\nSummary: {summary}\nSteps:\n{steps_block}"
        );
        let reply = self.gateway.complete(&self.default_model, &request).await?;
        let wire: GeneratedWorkflowWire = serde_json::from_str(strip_code_fence(&reply))?;
        let generated = GeneratedWorkflow {
            original_prompt: original_prompt.to_string(),
            shared_context: wire.shared_context,
            tasks: wire.tasks,
        };

        let probe = Workflow {
            workflow_id: WorkflowId::new(),
            original_prompt: generated.original_prompt.clone(),
            status: WorkflowStatus::Running,
            shared_context: generated.shared_context.clone(),
            tasks: generated.tasks.clone(),
            event_id: None,
            created_at: 0,
        };
        sb_core::validate_workflow(&probe)?;

        Ok(generated)
    }
}

/// LLMs reliably wrap JSON replies in markdown code fences despite being
/// asked not to; tolerate it rather than failing every other call.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end_matches("```").trim())
        .unwrap_or(trimmed)
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
