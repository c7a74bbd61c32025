// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static, pre-authored workflow templates for well-known anomaly shapes.
//! These skip the planner (and its LLM round-trip) entirely: the event's
//! `data` is substituted into a static YAML template using the same
//! expression language used for prompts and conditions, and the rendered
//! text is parsed directly into task blocks.

use crate::planner::GeneratedWorkflow;
use sb_core::{TaskBlock, Value};
use serde::Deserialize;
use thiserror::Error;

/// `anomaly.detected.disk_full` events carry `{service, host}` and map onto
/// a fixed two-step cleanup-then-verify remediation.
pub const ANOMALY_DISK_FULL: &str = "anomaly.detected.disk_full";

const DISK_FULL_REMEDIATION: &str = include_str!("../templates/disk_full_remediation.yaml");

#[derive(Debug, Error)]
pub enum TemplateInstantiationError {
    #[error("failed to render workflow template: {0}")]
    Render(#[from] sb_template::TemplateError),
    #[error("rendered workflow template is not valid workflow YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize)]
struct WorkflowTemplateWire {
    #[serde(default)]
    shared_context: Value,
    tasks: Vec<TaskBlock>,
}

/// Looks up the static template registered for `event_type`, if any, and
/// instantiates it against `data`. Returns `None` for event types with no
/// matching template -- the caller should fall back to the planner.
pub fn instantiate(event_type: &str, data: &Value) -> Option<Result<GeneratedWorkflow, TemplateInstantiationError>> {
    let template = match event_type {
        ANOMALY_DISK_FULL => DISK_FULL_REMEDIATION,
        _ => return None,
    };
    Some(render(event_type, template, data))
}

fn render(event_type: &str, template: &str, data: &Value) -> Result<GeneratedWorkflow, TemplateInstantiationError> {
    let rendered = sb_template::render_template(template, data)?;
    let wire: WorkflowTemplateWire = serde_yaml::from_str(&rendered)?;
    Ok(GeneratedWorkflow {
        original_prompt: format!("templated remediation for {event_type}"),
        shared_context: wire.shared_context,
        tasks: wire.tasks,
    })
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
