// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::ast::Segment;
use crate::error::TemplateError;
use crate::evaluator::eval;
use crate::parser::{parse_expr, parse_template};
use sb_core::Value;

/// Render a template string (mixed literal text and `{{ expr }}`
/// interpolations) against a context value, producing plain text for use as
/// an agent prompt.
pub fn render_template(template: &str, context: &Value) -> Result<String, TemplateError> {
    let segments = parse_template(template)?;
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(&text),
            Segment::Interp(expr) => out.push_str(&eval(&expr, context)?.render()),
        }
    }
    Ok(out)
}

/// Evaluate a bare boolean predicate (a `condition` or a conditional
/// branch's guard), returning its truthiness.
pub fn eval_condition(condition: &str, context: &Value) -> Result<bool, TemplateError> {
    let expr = parse_expr(condition)?;
    Ok(eval(&expr, context)?.as_bool())
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
