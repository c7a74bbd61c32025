// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no capable agent available for selector {0:?}")]
    NoAgentAvailable(String),
    #[error("dispatch failed: {0}")]
    DispatchFailed(#[from] sb_bus::BusError),
    #[error(transparent)]
    Store(#[from] sb_storage::StoreError),
    #[error("template error: {0}")]
    Template(#[from] sb_template::TemplateError),
}
