// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("corrupt WAL entry at byte offset {0}")]
    Corrupt(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than the highest known version {1}")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
    #[error("migration failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("workflow {0} already exists")]
    WorkflowAlreadyExists(sb_core::WorkflowId),
    #[error("workflow {0} not found")]
    WorkflowNotFound(sb_core::WorkflowId),
    #[error("goal {0} not found")]
    GoalNotFound(sb_core::GoalId),
    #[error("block {task_id} cannot transition from {from} to {to}")]
    IllegalTransition {
        task_id: sb_core::TaskId,
        from: sb_core::BlockStatus,
        to: sb_core::BlockStatus,
    },
    #[error("block {0} not found in workflow")]
    BlockNotFound(sb_core::TaskId),
    #[error("workflow {0} is not pending clarification")]
    NotPendingClarification(sb_core::WorkflowId),
}
