// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluates a parsed [`Expr`] against a context [`Value`].

use crate::ast::{BinaryOp, Expr};
use crate::error::TemplateError;
use sb_core::Value;

pub fn eval(expr: &Expr, context: &Value) -> Result<Value, TemplateError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Path(segments) => {
            let joined = segments.join(".");
            Ok(context.get_path(&joined).cloned().unwrap_or(Value::Null))
        }
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner, context)?.as_bool())),
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, context)?;
            let rhs = eval(rhs, context)?;
            eval_binary(op, lhs, rhs)
        }
        Expr::Filter { base, name, args } => {
            let base = eval(base, context)?;
            let args = args
                .iter()
                .map(|a| eval(a, context))
                .collect::<Result<Vec<_>, _>>()?;
            apply_filter(name, base, &args)
        }
    }
}

fn eval_binary(op: &BinaryOp, lhs: Value, rhs: Value) -> Result<Value, TemplateError> {
    Ok(match op {
        BinaryOp::Eq => Value::Bool(values_equal(&lhs, &rhs)),
        BinaryOp::Ne => Value::Bool(!values_equal(&lhs, &rhs)),
        BinaryOp::And => Value::Bool(lhs.as_bool() && rhs.as_bool()),
        BinaryOp::Or => Value::Bool(lhs.as_bool() || rhs.as_bool()),
        BinaryOp::In => Value::Bool(value_in(&lhs, &rhs)),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            let (l, r) = match (&lhs, &rhs) {
                (Value::Number(l), Value::Number(r)) => (*l, *r),
                _ => {
                    return Err(TemplateError::TypeMismatch { op: format!("{op:?}") });
                }
            };
            Value::Bool(match op {
                BinaryOp::Lt => l < r,
                BinaryOp::Gt => l > r,
                BinaryOp::Le => l <= r,
                BinaryOp::Ge => l >= r,
                _ => unreachable!(),
            })
        }
    })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => a.render() == b.render(),
    }
}

fn value_in(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|i| values_equal(i, needle)),
        Value::String(s) => s.contains(&needle.render()),
        Value::Object(map) => {
            if let Value::String(key) = needle {
                map.contains_key(key)
            } else {
                false
            }
        }
        _ => false,
    }
}

fn apply_filter(name: &str, base: Value, args: &[Value]) -> Result<Value, TemplateError> {
    match name {
        "upper" => Ok(Value::String(base.render().to_uppercase())),
        "lower" => Ok(Value::String(base.render().to_lowercase())),
        "title" => Ok(Value::String(title_case(&base.render()))),
        "trim" => Ok(Value::String(base.render().trim().to_string())),
        "length" => Ok(Value::Number(match &base {
            Value::Array(a) => a.len() as f64,
            Value::Object(o) => o.len() as f64,
            other => other.render().len() as f64,
        })),
        "default" => {
            if matches!(base, Value::Null) || base.render().is_empty() {
                Ok(args.first().cloned().unwrap_or(Value::Null))
            } else {
                Ok(base)
            }
        }
        "date" => {
            // `| date:"fmt"` only strips to a bare pass-through render since
            // timestamp formatting depends on a real calendar library the
            // orchestrator core does not otherwise need; this keeps the
            // filter's contract (a string comes out) without parsing epoch
            // seconds through an invented calendar routine.
            Ok(Value::String(base.render()))
        }
        other => Err(TemplateError::UnknownFilter(other.to_string())),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
