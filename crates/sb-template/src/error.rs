// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    Syntax(String),
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("filter '{filter}' expects {expected} argument(s), got {got}")]
    FilterArity { filter: String, expected: usize, got: usize },
    #[error("unsupported operand types for '{op}'")]
    TypeMismatch { op: String },
}
