// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A dynamically tagged value used for task results, shared context, and
//! template evaluation. Mirrors the loosely typed payloads produced by
//! agents, which may be a bare string or a structured JSON document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Parse a raw agent result string. If it looks like a JSON object or
    /// array, parse it as structured `Value`; otherwise keep it as a string.
    /// Malformed JSON that merely starts with `{`/`[` also falls back to a
    /// string, matching the source system's lenient "sniff" behaviour.
    pub fn from_agent_result(raw: &str) -> Value {
        let trimmed = raw.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(v) = serde_json::from_str::<Value>(raw) {
                return v;
            }
        }
        Value::String(raw.to_string())
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }

    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut cur = self;
        for segment in path.split('.') {
            match cur {
                Value::Object(map) => cur = map.get(segment)?,
                Value::Array(items) => {
                    let idx: usize = segment.parse().ok()?;
                    cur = items.get(idx)?;
                }
                _ => return None,
            }
        }
        Some(cur)
    }

    /// Render a human-readable representation for template interpolation.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }

    /// Deep-merge `other` into `self`. Scalars and arrays are overwritten by
    /// `other`'s leaf; nested objects are merged key by key, with `other`
    /// winning on overlapping leaves (last-writer-wins per leaf).
    pub fn deep_merge(&mut self, other: Value) {
        match (self, other) {
            (Value::Object(base), Value::Object(incoming)) => {
                for (k, v) in incoming {
                    match base.get_mut(&k) {
                        Some(existing) => existing.deep_merge(v),
                        None => {
                            base.insert(k, v);
                        }
                    }
                }
            }
            (slot, incoming) => *slot = incoming,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Object(BTreeMap::new())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Object(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
